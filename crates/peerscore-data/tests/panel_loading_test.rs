//! Integration tests for CSV panel loading.

use peerscore_data::{
    DataError, IsicSection, PanelColumns, RowPolicy, Sector, SizeTier, attach_start_years,
    load_panel, load_start_years,
};
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "peerscore_data_{}_{}",
        std::process::id(),
        name
    ));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_english_panel() {
    let path = write_temp(
        "english.csv",
        "company_id,year,sector,size_tier,sales,revenue,employees,capital,branches\n\
         100,2020,C,small,100,50,5,10,1\n\
         100,2021,C,small,n/a,60,6,0,1\n\
         200,2020,Information and communication,medium,300,90,12,30,2\n",
    );

    let records = load_panel(&path, &PanelColumns::default(), RowPolicy::RejectRun).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].company_id.as_str(), "100");
    assert_eq!(records[0].year, 2020);
    assert_eq!(records[0].sector, Sector::Isic(IsicSection::Manufacturing));
    assert_eq!(records[0].sales, Some(100.0));
    // Unparseable numeric cells degrade to missing values
    assert_eq!(records[1].sales, None);
    assert_eq!(records[1].capital, Some(0.0));
    assert_eq!(records[2].sector, Sector::Isic(IsicSection::Information));
    assert_eq!(records[2].size_tier, SizeTier::Medium);
    assert!(records.iter().all(|r| r.start_year.is_none()));
}

#[test]
fn test_load_arabic_panel() {
    let path = write_temp(
        "arabic.csv",
        "الرقم_الضريبي,السنة,القطاع,فئة_SME,المبيعات_جنيه,الإيرادات_جنيه,الموظفون,رأس_المال_المدفوع_جنيه,branches\n\
         7,2022,التعليم,صغير,10,5,2,4,1\n",
    );

    let records = load_panel(&path, &PanelColumns::arabic(), RowPolicy::RejectRun).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sector, Sector::Isic(IsicSection::Education));
    assert_eq!(records[0].size_tier, SizeTier::Small);
}

#[test]
fn test_missing_year_rejects_run() {
    let path = write_temp(
        "missing_year.csv",
        "company_id,year,sector,size_tier,sales,revenue,employees,capital,branches\n\
         100,2020,C,small,100,50,5,10,1\n\
         101,,C,small,100,50,5,10,1\n",
    );

    let err = load_panel(&path, &PanelColumns::default(), RowPolicy::RejectRun).unwrap_err();
    match err {
        DataError::Schema { row, field } => {
            assert_eq!(row, 1);
            assert_eq!(field, "year");
        }
        other => panic!("unexpected error: {other}"),
    }

    let records = load_panel(&path, &PanelColumns::default(), RowPolicy::SkipRecord).unwrap();
    fs::remove_file(&path).ok();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_start_year_merge() {
    let panel = write_temp(
        "merge_panel.csv",
        "company_id,year,sector,size_tier,sales,revenue,employees,capital,branches\n\
         100,2020,C,small,100,50,5,10,1\n\
         200,2020,C,small,100,50,5,10,1\n",
    );
    let companies = write_temp(
        "merge_companies.csv",
        "company_id,start_year\n100,2011\n300,1999\n",
    );

    let mut records = load_panel(&panel, &PanelColumns::default(), RowPolicy::RejectRun).unwrap();
    let lookup = load_start_years(&companies, "company_id", "start_year").unwrap();
    fs::remove_file(&panel).ok();
    fs::remove_file(&companies).ok();

    assert_eq!(lookup.len(), 2);
    assert_eq!(attach_start_years(&mut records, &lookup), 1);
    assert_eq!(records[0].start_year, Some(2011));
    assert_eq!(records[1].start_year, None);
}
