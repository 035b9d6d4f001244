// SPDX-License-Identifier: Apache-2.0

//! Scan pipeline.
//!
//! Options, CI detection, stage seams, upload types and the [`Scanner`]
//! that runs them in order.

pub mod ci;
pub mod options;
pub mod pipeline;
pub mod stages;
pub mod upload;
pub mod verdict;

pub use ci::{CiEnv, CiService, EnvCiService};
pub use options::{
    Clock, DEFAULT_INTEGRATION_NAME, SBOM_FORMATS, ScanOptions, SystemClock,
    generate_commit_name_timestamp,
};
pub use pipeline::{Scanner, handle_scan_error, write_api_reply_to_json_file};
pub use stages::{
    CallGraphConfig, CallGraphGenerator, CallGraphOptions, ResolveOptions, Resolver, SbomOrder,
    SbomReporter, default_call_graph_configs, parse_details_url,
};
pub use upload::{
    AutomationRule, Entitlements, FAIL_PIPELINE_ACTION, GitMeta, UploadOptions, UploadResult,
    Uploader,
};
pub use verdict::{Verdict, evaluate};
