use assert_cmd::Command;
use predicates::prelude::*;

fn rumah() -> Command {
    Command::cargo_bin("rumah").unwrap()
}

#[test]
fn no_arguments_prints_help() {
    rumah()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
    rumah()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rumah"));
}

#[test]
fn clean_rejects_non_csv_input() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = dir.path().join("listings.xlsx");
    std::fs::write(&xlsx, b"binary").unwrap();

    rumah()
        .arg("clean")
        .arg(&xlsx)
        .assert()
        .failure()
        .stderr(predicate::str::contains(".csv"));
}

#[test]
fn clean_writes_the_canonical_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    std::fs::write(
        &input,
        "Unnamed: 0,Unnamed: 1,Unnamed: 2,Unnamed: 3,Unnamed: 4,Unnamed: 5,Unnamed: 6\n\
         Harga,LT,LB,KT,KM,Garasi,Kota\n\
         2500000000,1200,900,5,3,2,Jakarta Selatan\n",
    )
    .unwrap();
    let output = dir.path().join("clean.csv");

    rumah()
        .arg("clean")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("Harga,LuasTanah,LuasBangunan"));
}

#[test]
fn predict_rejects_out_of_range_land_area() {
    rumah()
        .args([
            "predict",
            "listings.csv",
            "--land-area",
            "5",
            "--building-area",
            "100",
            "--bedrooms",
            "3",
            "--bathrooms",
            "2",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("5"));
}

#[test]
fn predict_requires_all_feature_flags() {
    rumah()
        .args(["predict", "listings.csv", "--land-area", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--building-area"));
}
