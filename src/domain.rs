use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ReshapeError;
use crate::schema::{self, KeySchema};

pub const EUROSTAT_BULK_URL: &str =
    "https://ec.europa.eu/eurostat/estat-navtree-portlet-prod/BulkDownloadListing?sort=1&file=data%2F";

/// One Eurostat table handled by a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Unload,
    Load,
    Motorway,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Unload => "unload",
            Dataset::Load => "load",
            Dataset::Motorway => "motorway",
        }
    }

    /// File name inside the bulk download listing.
    pub fn remote_file(&self) -> &'static str {
        match self {
            Dataset::Unload => "road_go_iq_utt.tsv.gz",
            Dataset::Load => "road_go_iq_ltt.tsv.gz",
            Dataset::Motorway => "tgs00114.tsv.gz",
        }
    }

    pub fn default_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.remote_file())
    }

    pub fn schema(&self) -> &'static KeySchema {
        match self {
            Dataset::Unload => &schema::UNLOAD,
            Dataset::Load => &schema::LOAD,
            Dataset::Motorway => &schema::MOTORWAY,
        }
    }

    /// Unit label to output file name. Rows with any other unit label are not written.
    pub fn outputs(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Dataset::Unload => &[
                (
                    "thousand_tonnes",
                    "road_freight_goods_unloaded_in_country_in_thousand_tonnes.csv",
                ),
                (
                    "million_tonne_km",
                    "road_freight_goods_unloaded_in_country_in_million_tonne_km.csv",
                ),
            ],
            Dataset::Load => &[
                (
                    "thousand_tonnes",
                    "road_freight_goods_loaded_in_country_in_thousand_tonnes.csv",
                ),
                (
                    "million_tonne_km",
                    "road_freight_goods_loaded_in_country_in_million_tonne_km.csv",
                ),
            ],
            Dataset::Motorway => &[
                ("KM", "motorway_network_unit_km.csv"),
                (
                    "KM_TKM2",
                    "motorway_network_unit_km_per_thousand_square_km.csv",
                ),
            ],
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = ReshapeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unload" => Ok(Dataset::Unload),
            "load" => Ok(Dataset::Load),
            "motorway" => Ok(Dataset::Motorway),
            _ => Err(ReshapeError::InvalidDataset(value.to_string())),
        }
    }
}

/// Which pipelines a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Selection {
    Goods,
    Motorway,
    #[default]
    All,
}

impl Selection {
    /// Datasets in processing order. Goods runs unload before load.
    pub fn datasets(&self) -> &'static [Dataset] {
        match self {
            Selection::Goods => &[Dataset::Unload, Dataset::Load],
            Selection::Motorway => &[Dataset::Motorway],
            Selection::All => &[Dataset::Unload, Dataset::Load, Dataset::Motorway],
        }
    }
}
