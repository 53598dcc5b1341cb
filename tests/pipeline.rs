use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use flate2::Compression;
use flate2::write::GzEncoder;

use eurostat_reshape::app::{App, RunOptions};
use eurostat_reshape::config::ResolvedConfig;
use eurostat_reshape::domain::{Dataset, EUROSTAT_BULK_URL, Selection};
use eurostat_reshape::error::ReshapeError;
use eurostat_reshape::fetch::Fetcher;

const UNLOAD_TSV: &str = "unit,carriage,c_load,geo\\time\t2016 \t2015 \n\
THS_T,TOT,DE,FR\t10 \t: \n\
MIO_TKM,HIRE,DE,FR\t 2.5 \t3 \n\
THS_T,TOT,DE,FR\t10 \t: \n\
PC,TOT,DE,FR\t1 \t1 \n";

const LOAD_TSV: &str = "unit,carriage,c_unload,geo\\time\t2015 \n\
THS_T,OWN,FR,DE\t7 \n";

const MOTORWAY_TSV: &str = "tra_infr,unit,geo\\time\t2019 \t2020 \n\
MWAY,KM,DE21\t100 \t101 \n\
MWAY,KM_TKM2,DE21\t: \t5 \n";

/// Serves gzip fixtures keyed by the remote file name in the URL.
#[derive(Default)]
struct FixtureFetcher {
    calls: RefCell<Vec<String>>,
}

impl Fetcher for FixtureFetcher {
    fn download(&self, url: &str, destination: &Path) -> Result<u64, ReshapeError> {
        self.calls.borrow_mut().push(url.to_string());
        let body = if url.ends_with(Dataset::Unload.remote_file()) {
            UNLOAD_TSV
        } else if url.ends_with(Dataset::Load.remote_file()) {
            LOAD_TSV
        } else if url.ends_with(Dataset::Motorway.remote_file()) {
            MOTORWAY_TSV
        } else {
            return Err(ReshapeError::HttpStatus {
                status: 404,
                url: url.to_string(),
            });
        };
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).unwrap();
        let bytes = encoder.finish().unwrap();
        fs::write(destination, &bytes).unwrap();
        Ok(bytes.len() as u64)
    }
}

fn config(root: &Path) -> ResolvedConfig {
    let root = Utf8PathBuf::from_path_buf(root.to_path_buf()).unwrap();
    ResolvedConfig {
        output_dir: root.join("dataset"),
        cache_dir: root.join("cache"),
        timeout: Duration::from_secs(1),
        base_url: EUROSTAT_BULK_URL.to_string(),
        urls: Default::default(),
    }
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join("dataset").join(file)).unwrap()
}

#[test]
fn goods_pipeline_writes_four_files() {
    let temp = tempfile::tempdir().unwrap();
    let app = App::new(config(temp.path()), FixtureFetcher::default());

    let report = app.run(Selection::Goods, RunOptions::default()).unwrap();
    assert_eq!(report.datasets.len(), 2);
    assert_eq!(report.datasets[0].dataset, Dataset::Unload);

    let unload = &report.datasets[0];
    assert_eq!(unload.input_rows, 4);
    assert_eq!(unload.duplicate_rows, 1);
    assert_eq!(unload.year_columns, 2);
    assert_eq!(unload.long_rows, 6);
    assert_eq!(unload.dropped.len(), 1);
    assert_eq!(unload.dropped[0].unit, "PC");
    let written: usize = unload.outputs.iter().map(|output| output.rows).sum();
    assert_eq!(written + unload.dropped[0].rows, unload.long_rows);

    assert_eq!(
        read(
            temp.path(),
            "road_freight_goods_unloaded_in_country_in_thousand_tonnes.csv"
        ),
        "country,load_country,carriage,year,value,unit\n\
         FR,DE,total,2016,10,thousand_tonnes\n\
         FR,DE,total,2015,,thousand_tonnes\n"
    );
    assert_eq!(
        read(
            temp.path(),
            "road_freight_goods_unloaded_in_country_in_million_tonne_km.csv"
        ),
        "country,load_country,carriage,year,value,unit\n\
         FR,DE,hire_or_reward,2016,2.5,million_tonne_km\n\
         FR,DE,hire_or_reward,2015,3,million_tonne_km\n"
    );
    assert_eq!(
        read(
            temp.path(),
            "road_freight_goods_loaded_in_country_in_thousand_tonnes.csv"
        ),
        "country,unload_country,carriage,year,value,unit\n\
         DE,FR,own_account,2015,7,thousand_tonnes\n"
    );
    assert_eq!(
        read(
            temp.path(),
            "road_freight_goods_loaded_in_country_in_million_tonne_km.csv"
        ),
        "country,unload_country,carriage,year,value,unit\n"
    );
}

#[test]
fn motorway_pipeline_keeps_raw_unit_codes() {
    let temp = tempfile::tempdir().unwrap();
    let app = App::new(config(temp.path()), FixtureFetcher::default());

    app.run(Selection::Motorway, RunOptions::default()).unwrap();
    assert_eq!(
        read(temp.path(), "motorway_network_unit_km.csv"),
        "transport_infrastructure,country,nuts_2,year,value,unit\n\
         motorways,DE,DE21,2019,100,KM\n\
         motorways,DE,DE21,2020,101,KM\n"
    );
    assert_eq!(
        read(
            temp.path(),
            "motorway_network_unit_km_per_thousand_square_km.csv"
        ),
        "transport_infrastructure,country,nuts_2,year,value,unit\n\
         motorways,DE,DE21,2019,,KM_TKM2\n\
         motorways,DE,DE21,2020,5,KM_TKM2\n"
    );
}

#[test]
fn rerun_is_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let app = App::new(config(temp.path()), FixtureFetcher::default());

    app.run(Selection::All, RunOptions::default()).unwrap();
    let first = read(temp.path(), "motorway_network_unit_km.csv");
    let first_goods = read(
        temp.path(),
        "road_freight_goods_unloaded_in_country_in_thousand_tonnes.csv",
    );
    app.run(Selection::All, RunOptions { offline: true }).unwrap();
    assert_eq!(read(temp.path(), "motorway_network_unit_km.csv"), first);
    assert_eq!(
        read(
            temp.path(),
            "road_freight_goods_unloaded_in_country_in_thousand_tonnes.csv"
        ),
        first_goods
    );
}

#[test]
fn offline_reuses_cache_without_downloading() {
    let temp = tempfile::tempdir().unwrap();
    let fetcher = FixtureFetcher::default();
    let app = App::new(config(temp.path()), fetcher);

    app.run(Selection::Motorway, RunOptions::default()).unwrap();
    let report = app
        .run(Selection::Motorway, RunOptions { offline: true })
        .unwrap();
    assert!(report.datasets[0].source.ends_with("motorway.tsv.gz"));
    assert_eq!(app.fetcher().calls.borrow().len(), 1);
    assert!(app.layout().archive_path(Dataset::Motorway).as_std_path().exists());
}

#[test]
fn offline_without_cache_fails() {
    let temp = tempfile::tempdir().unwrap();
    let app = App::new(config(temp.path()), FixtureFetcher::default());
    let err = app
        .run(Selection::Motorway, RunOptions { offline: true })
        .unwrap_err();
    assert_matches!(err, ReshapeError::MissingCache(_));
}

#[test]
fn failing_download_stops_the_run() {
    let temp = tempfile::tempdir().unwrap();
    let mut config = config(temp.path());
    config
        .urls
        .insert(Dataset::Load, "https://example.invalid/missing.tsv.gz".to_string());
    let app = App::new(config, FixtureFetcher::default());

    let err = app.run(Selection::Goods, RunOptions::default()).unwrap_err();
    assert_matches!(err, ReshapeError::HttpStatus { status: 404, .. });
    // unload ran first and keeps its outputs
    assert!(
        temp.path()
            .join("dataset/road_freight_goods_unloaded_in_country_in_thousand_tonnes.csv")
            .exists()
    );
    assert!(
        !temp
            .path()
            .join("dataset/road_freight_goods_loaded_in_country_in_thousand_tonnes.csv")
            .exists()
    );
}

#[test]
fn transform_file_reads_local_tsv() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("motorway.tsv");
    fs::write(&input, MOTORWAY_TSV).unwrap();
    let app = App::new(config(temp.path()), FixtureFetcher::default());

    let input = Utf8PathBuf::from_path_buf(input).unwrap();
    let report = app.transform_file(Dataset::Motorway, &input).unwrap();
    assert_eq!(report.long_rows, 4);
    assert_eq!(report.outputs[0].rows, 2);
    assert_eq!(report.outputs[1].rows, 2);
}
