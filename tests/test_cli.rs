use assert_cmd::Command;
use std::fs;

const SCAN_REPORT: &str = ">seq1:[50,10]\naggagg cccccc atg\n";

#[test]
fn test_missing_arguments_print_usage() -> anyhow::Result<()> {
    let out = Command::cargo_bin("genemarkhmm2gff")?
        .arg("only_input.out")
        .output()?;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8(out.stdout)?.starts_with("Usage: genemarkhmm2gff"));

    let out = Command::cargo_bin("scanformatches2gff")?
        .args(["in.txt", "out.gff3"])
        .output()?;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8(out.stdout)?.starts_with("Usage: scanformatches2gff"));
    Ok(())
}

#[test]
fn test_genemark_requires_exactly_two_arguments() -> anyhow::Result<()> {
    for args in [vec!["in.gm"], vec!["in.gm", "out.gff3", "extra.fa"]] {
        let out = Command::cargo_bin("genemark2gff")?.args(&args).output()?;
        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8(out.stdout)?.starts_with("Usage: genemark2gff"));
    }
    Ok(())
}

#[test]
fn test_extra_positionals_print_usage() -> anyhow::Result<()> {
    let out = Command::cargo_bin("genemarkhmm2gff")?
        .args(["in.out", "out.gff3", "seq.fa", "extra"])
        .output()?;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8(out.stdout)?.starts_with("Usage: genemarkhmm2gff"));

    let out = Command::cargo_bin("scanformatches2gff")?
        .args(["in.txt", "out.gff3", "RBS", "seq.fa", "extra"])
        .output()?;
    assert_eq!(out.status.code(), Some(1));
    Ok(())
}

#[test]
fn test_scan_for_matches_binary() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("hits.txt");
    let output = dir.path().join("hits.gff3");
    fs::write(&input, SCAN_REPORT)?;

    Command::cargo_bin("scanformatches2gff")?
        .arg(&input)
        .arg(&output)
        .arg("RBS")
        .assert()
        .success()
        .stdout(format!(
            "GFF3 file '{}' written successfully.\n",
            output.display()
        ));

    let content = fs::read_to_string(&output)?;
    assert_eq!(
        content,
        "##gff-version 3\nseq1\tscan_for_matches\tRBS\t10\t50\t.\t-\t.\tID=RBS_1;Note=scan_for_matches_prediction;Start_Codon=atg\n"
    );
    Ok(())
}

#[test]
fn test_missing_input_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = Command::cargo_bin("genemarkhmm2gff")?
        .arg(dir.path().join("missing.out"))
        .arg(dir.path().join("out.gff3"))
        .output()?;
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr)?.contains("missing.out"));
    Ok(())
}
