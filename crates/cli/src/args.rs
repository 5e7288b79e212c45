use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use skyscan_core::filter::AckFilter;
use skyscan_core::models::Severity;

/// Terminal front-end for the detection service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Backend base URL, overriding `SKYSCAN_API_URL`
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the backend and its model are up
    Health,

    /// Show the detector's class table
    ModelInfo,

    /// Upload an image (PNG, JPEG, GIF or BMP, at most 50 MiB)
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Browse uploaded images, newest first
    Gallery {
        #[arg(long, default_value = "1", value_name = "N")]
        page: u32,

        /// Also show detections and alerts of one image
        #[arg(long, value_name = "ID")]
        image: Option<i64>,
    },

    /// Images with their detections and alerts
    Results {
        #[arg(long, default_value = "1", value_name = "N")]
        page: u32,
    },

    /// List alerts
    Alerts {
        #[arg(long, default_value = "1", value_name = "N")]
        page: u32,

        #[arg(long, value_enum)]
        severity: Option<SeverityArg>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Acknowledge an alert
    Ack {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Aggregate counts by class and severity
    Stats,

    /// All detections, optionally for one class
    Detections {
        #[arg(long, default_value = "1", value_name = "N")]
        page: u32,

        #[arg(long, value_name = "NAME")]
        class: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SeverityArg {
    High,
    Medium,
    Low,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::High => Severity::High,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::Low => Severity::Low,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Unacknowledged,
    Acknowledged,
}

impl From<StatusArg> for AckFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Unacknowledged => AckFilter::Unacknowledged,
            StatusArg::Acknowledged => AckFilter::Acknowledged,
        }
    }
}
