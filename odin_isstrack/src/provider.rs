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

//! where positions come from. The scheduler only sees the [`PositionProvider`] trait, the HTTP implementation
//! below queries a JSON endpoint such as open-notify's `iss-now.json`:
//! ```json
//! {"timestamp": 1700000000, "message": "success", "iss_position": {"latitude": "-12.3456", "longitude": "101.2345"}}
//! ```

use std::time::Duration;
use async_trait::async_trait;
use serde::{Serialize,Deserialize};
use serde_json::Value;
use reqwest::Client;
use crate::geo::GeoPosition;
use crate::datetime::{secs,de_duration_from_fractional_secs,ser_duration_as_fractional_secs};
use crate::errors::{Result,invalid_position};

pub const DEFAULT_URL: &str = "http://api.open-notify.org/iss-now.json";

#[async_trait]
pub trait PositionProvider: Send {
    /// get the current position. Errors are reported to the caller, which decides whether to retry
    async fn fetch_position (&mut self)->Result<GeoPosition>;
}

/* #region JSON validation *********************************************************************************/

/// extract and validate a position from an untyped JSON record. The coordinates can either be top level
/// fields or nested in an "iss_position" object, and can be numbers or numeric strings
pub fn position_from_json (v: &Value)->Result<GeoPosition> {
    let rec = match v.get("iss_position") {
        Some(nested) => nested,
        None => v
    };

    let lat = coordinate( rec, "latitude")?;
    let lon = coordinate( rec, "longitude")?;
    GeoPosition::new( lat, lon)
}

fn coordinate (rec: &Value, key: &str)->Result<f64> {
    match rec.get(key) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else( || invalid_position!("{key} not representable: {n}")),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err( |_| invalid_position!("{key} not a number: {s:?}")),
        Some(other) => Err( invalid_position!("{key} has wrong type: {other}")),
        None => Err( invalid_position!("no {key} in {rec}"))
    }
}

/* #endregion JSON validation */

/* #region HTTP provider ***********************************************************************************/

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct ProviderConfig {
    #[serde(default="default_url")]
    pub url: String,

    /// hard upper bound for a single request
    #[serde(default="default_timeout", serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub timeout: Duration,
}

fn default_url()->String { DEFAULT_URL.to_string() }
fn default_timeout()->Duration { secs(10) }

impl Default for ProviderConfig {
    fn default()->Self {
        ProviderConfig { url: default_url(), timeout: default_timeout() }
    }
}

pub struct OpenNotifyProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenNotifyProvider {
    pub fn new (config: ProviderConfig)->Result<Self> {
        let client = Client::builder()
            .timeout( config.timeout)
            .build()?;
        Ok( OpenNotifyProvider { config, client } )
    }

    pub fn url (&self)->&str { self.config.url.as_str() }
}

#[async_trait]
impl PositionProvider for OpenNotifyProvider {
    async fn fetch_position (&mut self)->Result<GeoPosition> {
        let response = self.client.get( &self.config.url).send().await?.error_for_status()?;
        let v: Value = response.json().await?;
        if let Some(msg) = v.get("message").and_then( |m| m.as_str()) {
            if msg != "success" {
                return Err( invalid_position!("provider reported '{msg}'"))
            }
        }
        position_from_json( &v)
    }
}

/* #endregion HTTP provider */
