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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OdinIssTrackError>;

#[derive(Error,Debug)]
pub enum OdinIssTrackError {

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("JSON error {0}")]
    JsonError( #[from] serde_json::Error),

    #[error("config parse error {0}")]
    RonError( #[from] ron::error::SpannedError),

    #[error("image error {0}")]
    ImageError( #[from] image::ImageError),

    #[error("config error {0}")]
    ConfigError( String ),

    #[error("invalid position {0}")]
    InvalidPosition( String ),

    #[error("invalid dimensions {0}")]
    InvalidDimensions( String ),

    #[error("display error {0}")]
    DisplayError( String ),

    #[error("timeout {0}")]
    Timeout( String ),

    #[error("operation failed {0}")]
    OpFailedError( String ),
}

impl OdinIssTrackError {
    /// errors we expect to go away by just trying again in the next sampling cycle
    pub fn is_transient (&self)->bool {
        match self {
            OdinIssTrackError::HttpError(_) |
            OdinIssTrackError::JsonError(_) |
            OdinIssTrackError::InvalidPosition(_) |
            OdinIssTrackError::Timeout(_) |
            OdinIssTrackError::IOError(_) => true,
            _ => false
        }
    }
}

macro_rules! config_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::OdinIssTrackError::ConfigError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use config_error;

macro_rules! invalid_position {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::OdinIssTrackError::InvalidPosition( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use invalid_position;

macro_rules! display_error {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::OdinIssTrackError::DisplayError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use display_error;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        $crate::errors::OdinIssTrackError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
