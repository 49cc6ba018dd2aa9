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

use tokio_util::sync::CancellationToken;
use tracing::info;
use crate::errors::{Result,op_failed};

/// cancel `token` upon receiving a ctrl-c (or termination) signal. This does not exit the process, it is
/// up to the token holders to shut down in an orderly way
pub fn cancel_on_ctrlc (token: CancellationToken)->Result<()> {
    ctrlc::set_handler( move || {
        info!("received termination signal");
        token.cancel();
    }).map_err( |e| op_failed!("failed to set signal handler: {e}"))
}
