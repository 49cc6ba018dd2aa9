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

//! time related helpers. Durations in our RON configs are given as fractional seconds (e.g. `sampling_interval: 30.0`)

use std::time::Duration;
use chrono::{DateTime,Local,Timelike};
use serde::{Deserialize,Deserializer,Serializer};

#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }

/// the nominal period of a low earth orbit (~90min), used to turn orbit counts into sample counts
pub const LEO_ORBIT_PERIOD: Duration = Duration::from_secs(90 * 60);

pub fn ser_duration_as_fractional_secs<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_f64( dur.as_secs_f64())
}

/// note this rejects negative and non-finite values, which would panic in `Duration::from_secs_f64`
pub fn de_duration_from_fractional_secs <'a,D>(deserializer: D) -> Result<Duration,D::Error> where D: Deserializer<'a> {
    let secs: f64 = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err( |e| serde::de::Error::custom( format!("invalid duration {secs}: {e}")))
}

/// formatting for status output - we only need second resolution
pub fn fmt_secs (dur: &Duration)->String {
    format!("{:.1}s", dur.as_secs_f64())
}

pub fn local_hour (dt: &DateTime<Local>)->u32 {
    dt.hour()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct D {
        #[serde(deserialize_with="de_duration_from_fractional_secs")]
        d: Duration
    }

    #[test]
    fn test_fractional_secs () {
        let d: D = ron::from_str("(d: 1.5)").unwrap();
        assert_eq!( d.d, millis(1500));

        assert!( ron::from_str::<D>("(d: -1.0)").is_err());
    }
}
