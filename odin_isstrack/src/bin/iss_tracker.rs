/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{path::PathBuf, sync::Arc};
use clap::Parser;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use odin_isstrack::{
    load_config, Scheduler,
    clock::SystemClock, display::ImageFileSink, provider::OpenNotifyProvider, process::cancel_on_ctrlc
};

/// ISS ground track display
#[derive(Parser,Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// tracker config file (RON)
    #[arg(long, default_value = "configs/iss_tracker.ron")]
    config: PathBuf,

    /// directory to write display frames to (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = load_config( &args.config)?;
    if let Some(dir) = args.output_dir {
        config.display.output_dir = dir;
    }
    info!("using config {:?}", args.config);

    let renderer = config.create_renderer()?;
    let provider = OpenNotifyProvider::new( config.provider.clone())?;
    let sink = ImageFileSink::from_config( &config.display, &config.map.map())?;
    info!("position source: {}, display output: {:?}", provider.url(), sink.output_dir());

    let cancel = CancellationToken::new();
    cancel_on_ctrlc( cancel.clone())?;

    let mut scheduler = Scheduler::new( config.scheduler_config(), provider, sink, renderer, config.create_store(), Arc::new(SystemClock), cancel);
    scheduler.run().await?;

    Ok(())
}
