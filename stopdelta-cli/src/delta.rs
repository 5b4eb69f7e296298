//! Delta command implementation for the stopdelta CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geo::{Coord, Rect};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stopdelta_core::{StationId, Unbounded};
use stopdelta_data::candidates::{DEFAULT_LAT_COLUMN, DEFAULT_LON_COLUMN, DEFAULT_NAME_COLUMN};
use stopdelta_data::dedup::NEAR_DUPLICATE_SAMPLE;
use stopdelta_data::pipeline::{DEFAULT_EXCLUDED_NAME, DEFAULT_THRESHOLD_METRES};
use stopdelta_data::{
    DeltaLayout, DeltaReport, DeltaSettings, ProviderFeed, ProviderSource, run_delta,
};

use crate::{
    ARG_BBOX, ARG_BEGINNING_ID, ARG_DELTA_DIR, ARG_EXCLUDED_NAME, ARG_FORCE, ARG_LAT_COLUMN,
    ARG_LON_COLUMN, ARG_NAME_COLUMN, ARG_PROVIDERS, ARG_RAW_DIR, ARG_REFERENCE,
    ARG_THRESHOLD_METRES, CliError, ENV_PROVIDERS,
};

pub(crate) const DEFAULT_RAW_DIR: &str = "data/raw";
pub(crate) const DEFAULT_DELTA_DIR: &str = "data/processed/delta";

/// CLI arguments for the `delta` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Persist each provider's downloaded stops.txt, and when any \
                 feed changed merge the stops into the coordinate ledger, \
                 clean it, assign identifiers and extend the name index.",
    about = "Merge changed provider feeds into the delta files"
)]
#[ortho_config(prefix = "STOPDELTA")]
pub(crate) struct DeltaArgs {
    /// Comma-separated provider feeds, each written as NAME=PATH.
    #[arg(long = ARG_PROVIDERS, value_name = "list")]
    #[serde(default)]
    pub(crate) providers: Option<String>,
    /// Directory holding the reference baseline and last-seen feeds.
    #[arg(long = ARG_RAW_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) raw_dir: Option<Utf8PathBuf>,
    /// Directory receiving the delta files.
    #[arg(long = ARG_DELTA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) delta_dir: Option<Utf8PathBuf>,
    /// Override the reference baseline location.
    #[arg(long = ARG_REFERENCE, value_name = "path")]
    #[serde(default)]
    pub(crate) reference: Option<Utf8PathBuf>,
    /// Identifier handed to the first new station.
    #[arg(long = ARG_BEGINNING_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) beginning_id: Option<u32>,
    /// Stops closer than this many metres are merged.
    #[arg(long = ARG_THRESHOLD_METRES, value_name = "metres")]
    #[serde(default)]
    pub(crate) threshold_metres: Option<f64>,
    /// Entries whose name contains this text are removed.
    #[arg(long = ARG_EXCLUDED_NAME, value_name = "text")]
    #[serde(default)]
    pub(crate) excluded_name: Option<String>,
    /// Latitude column of the provider feeds.
    #[arg(long = ARG_LAT_COLUMN, value_name = "column")]
    #[serde(default)]
    pub(crate) lat_column: Option<String>,
    /// Longitude column of the provider feeds.
    #[arg(long = ARG_LON_COLUMN, value_name = "column")]
    #[serde(default)]
    pub(crate) lon_column: Option<String>,
    /// Stop name column of the provider feeds.
    #[arg(long = ARG_NAME_COLUMN, value_name = "column")]
    #[serde(default)]
    pub(crate) name_column: Option<String>,
    /// Territory as MIN_LON,MIN_LAT,MAX_LON,MAX_LAT; all stops when unset.
    #[arg(long = ARG_BBOX, value_name = "bbox")]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// Run even when no feed changed.
    #[arg(long = ARG_FORCE)]
    #[serde(default)]
    pub(crate) force: bool,
}

impl DeltaArgs {
    pub(crate) fn into_config(self) -> Result<DeltaConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DeltaConfig::try_from(merged)
    }
}

/// Resolved `delta` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DeltaConfig {
    pub(crate) layout: DeltaLayout,
    pub(crate) settings: DeltaSettings,
    pub(crate) providers: Vec<ProviderSource>,
    pub(crate) territory: Option<Rect<f64>>,
}

impl DeltaConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.layout.reference, ARG_REFERENCE)
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match stopdelta_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TryFrom<DeltaArgs> for DeltaConfig {
    type Error = CliError;

    fn try_from(args: DeltaArgs) -> Result<Self, Self::Error> {
        let providers = args.providers.as_deref().ok_or(CliError::MissingArgument {
            field: ARG_PROVIDERS,
            env: ENV_PROVIDERS,
        })?;
        let template = ProviderFeed {
            name: String::new(),
            lat_column: args.lat_column.unwrap_or_else(|| DEFAULT_LAT_COLUMN.to_owned()),
            lon_column: args.lon_column.unwrap_or_else(|| DEFAULT_LON_COLUMN.to_owned()),
            name_column: args.name_column.unwrap_or_else(|| DEFAULT_NAME_COLUMN.to_owned()),
        };
        let providers = parse_providers(providers, &template)?;

        let threshold_metres = args.threshold_metres.unwrap_or(DEFAULT_THRESHOLD_METRES);
        if !threshold_metres.is_finite() || threshold_metres < 0.0 {
            return Err(CliError::InvalidThreshold {
                value: threshold_metres,
            });
        }
        let territory = args.bbox.as_deref().map(parse_bbox).transpose()?;

        let raw_dir = args.raw_dir.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_RAW_DIR));
        let delta_dir = args
            .delta_dir
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DELTA_DIR));
        let mut layout = DeltaLayout::new(raw_dir, delta_dir);
        if let Some(reference) = args.reference {
            layout.reference = reference;
        }

        let defaults = DeltaSettings::default();
        let settings = DeltaSettings {
            beginning_id: args.beginning_id.map_or(defaults.beginning_id, StationId::new),
            threshold_metres,
            excluded_name: args
                .excluded_name
                .unwrap_or_else(|| DEFAULT_EXCLUDED_NAME.to_owned()),
            force: args.force,
        };
        Ok(Self {
            layout,
            settings,
            providers,
            territory,
        })
    }
}

/// Parse `NAME=PATH[,NAME=PATH...]`, giving each feed the template's columns.
pub(crate) fn parse_providers(
    list: &str,
    template: &ProviderFeed,
) -> Result<Vec<ProviderSource>, CliError> {
    list.split(',')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(|spec| {
            let invalid = || CliError::InvalidProvider {
                spec: spec.to_owned(),
            };
            let (name, path) = spec.split_once('=').ok_or_else(invalid)?;
            let (name, path) = (name.trim(), path.trim());
            if name.is_empty() || path.is_empty() {
                return Err(invalid());
            }
            Ok(ProviderSource {
                feed: ProviderFeed {
                    name: name.to_owned(),
                    ..template.clone()
                },
                incoming: Utf8PathBuf::from(path),
            })
        })
        .collect()
}

/// Parse `MIN_LON,MIN_LAT,MAX_LON,MAX_LAT` into a rectangle.
pub(crate) fn parse_bbox(value: &str) -> Result<Rect<f64>, CliError> {
    let invalid = || CliError::InvalidBoundingBox {
        value: value.to_owned(),
    };
    let numbers = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;
    let [min_lon, min_lat, max_lon, max_lat] = numbers.as_slice() else {
        return Err(invalid());
    };
    Ok(Rect::new(
        Coord {
            x: *min_lon,
            y: *min_lat,
        },
        Coord {
            x: *max_lon,
            y: *max_lat,
        },
    ))
}

pub(crate) fn run_delta_command(args: DeltaArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    debug!("Resolved delta configuration: {config:?}");
    let report = execute_delta(&config)?;
    write_summary(writer, &report).map_err(CliError::WriteSummary)?;
    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::ProvidersFailed {
            providers: report
                .failures
                .iter()
                .map(|failure| failure.provider.clone())
                .collect(),
        })
    }
}

pub(crate) fn execute_delta(config: &DeltaConfig) -> Result<DeltaReport, CliError> {
    let report = match &config.territory {
        Some(bbox) => run_delta(&config.layout, &config.settings, &config.providers, bbox)?,
        None => run_delta(
            &config.layout,
            &config.settings,
            &config.providers,
            &Unbounded,
        )?,
    };
    Ok(report)
}

pub(crate) fn write_summary(writer: &mut dyn Write, report: &DeltaReport) -> std::io::Result<()> {
    if report.unchanged {
        writeln!(writer, "No provider feed changed; nothing to do")?;
    } else {
        for (provider, merge) in &report.merges {
            writeln!(
                writer,
                "{provider}: {} appended, {} in reference, {} already in ledger",
                merge.appended, merge.duplicates_in_reference, merge.duplicates_in_ledger
            )?;
        }
        let clean = &report.clean;
        writeln!(
            writer,
            "Cleaning: {} excluded, {} near duplicates, {} kept",
            clean.removed_excluded.len(),
            clean.removed_near.len(),
            clean.kept
        )?;
        for duplicate in clean.near_duplicate_sample() {
            writeln!(
                writer,
                "  {} -> {} ({:.1} m)",
                duplicate.name, duplicate.kept_name, duplicate.distance_metres
            )?;
        }
        if clean.removed_near.len() > NEAR_DUPLICATE_SAMPLE {
            writeln!(
                writer,
                "  ... and {} more",
                clean.removed_near.len() - NEAR_DUPLICATE_SAMPLE
            )?;
        }
        writeln!(
            writer,
            "Identifiers: {} assigned, {} retained",
            report.allocation.assigned.len(),
            report.allocation.retained
        )?;
        for (provider, names) in &report.names {
            writeln!(
                writer,
                "{provider}: {} names added, {} already present",
                names.added, names.already_present
            )?;
        }
    }
    for failure in &report.failures {
        writeln!(writer, "{} failed: {}", failure.provider, failure.error)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<DeltaConfig, CliError> {
    let merged = DeltaArgs::merge_from_layers(layers).map_err(CliError::from)?;
    DeltaConfig::try_from(merged)
}
