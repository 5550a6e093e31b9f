use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tagviz_cli::{Loader, Pipeline, PipelineInputs, TagvizConfig};
use tagviz_test_utils::{SAMPLE_CORPUS, SAMPLE_OUTLINE};
use tempfile::TempDir;

fn write_inputs(dir: &Path) -> PipelineInputs {
    let outline = dir.join("tags.md");
    let papers = dir.join("papers.json");
    fs::write(&outline, SAMPLE_OUTLINE).unwrap();
    fs::write(&papers, SAMPLE_CORPUS).unwrap();
    PipelineInputs::new(outline, papers)
}

fn pipeline_into(out: &Path) -> Pipeline {
    let config = Loader::new()
        .set_override("output.dir", out.display().to_string())
        .unwrap()
        .build()
        .unwrap();
    Pipeline::new(config).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn build_writes_every_artifact() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());
    let out = work.path().join("site");

    let report = pipeline_into(&out).build(&inputs).unwrap();

    let mut names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "crossLevelConnections.json",
            "hierarchyMapping.json",
            "nodeMetadata.json",
            "platformConfiguration.json",
            "processedPapers.json",
            "taxonomy.json",
        ]
    );
    assert_eq!(report.written.len(), 6);
    assert_eq!(report.papers, 3);
    assert_eq!(report.skipped_papers, 1);
    assert_eq!(report.resolution.total_dropped(), 1);

    let connections = read_json(&out.join("crossLevelConnections.json"));
    assert_eq!(connections["levelCombinations"].as_array().unwrap().len(), 27);
    assert_eq!(
        connections["connections"]["PlatformAttribute_L1__ResearchContent_L3"]["Weibo__Age"]
            ["paperIds"],
        serde_json::json!(["paper_001"])
    );

    let processed = read_json(&out.join("processedPapers.json"));
    assert_eq!(processed["papers"][2]["id"], "paper_003");
    assert_eq!(processed["papers"][2]["doi"], "10.1000/fandom");

    let taxonomy = read_json(&out.join("taxonomy.json"));
    assert_eq!(taxonomy["nodes"].as_array().unwrap().len(), 39);
}

#[test]
fn missing_input_writes_nothing() {
    let work = TempDir::new().unwrap();
    let mut inputs = write_inputs(work.path());
    inputs.papers = work.path().join("absent.json");
    let out = work.path().join("site");

    let err = pipeline_into(&out).build(&inputs).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
    assert!(!out.exists());
}

#[test]
fn unreadable_corpus_is_fatal() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());
    fs::write(&inputs.papers, "{\"notPapers\": true}").unwrap();
    let out = work.path().join("site");

    assert!(pipeline_into(&out).build(&inputs).is_err());
    assert!(!out.exists());
}

#[test]
fn parallel_output_is_byte_identical() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());

    let sequential = Pipeline::new(TagvizConfig::load_defaults().unwrap())
        .unwrap()
        .run(&inputs)
        .unwrap();
    let parallel_config = Loader::new()
        .set_override("aggregation.parallel", true)
        .unwrap()
        .build()
        .unwrap();
    let parallel = Pipeline::new(parallel_config).unwrap().run(&inputs).unwrap();

    assert_eq!(sequential.artifacts, parallel.artifacts);
}

#[test]
fn configured_names_and_compact_output() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());
    let out = work.path().join("site");

    let config = Loader::new()
        .with_str(
            "user",
            "[output]\npretty = false\n\n[output.files]\ncross_level_connections = \"links.json\"\n",
        )
        .set_override("output.dir", out.display().to_string())
        .unwrap()
        .build()
        .unwrap();
    Pipeline::new(config).unwrap().build(&inputs).unwrap();

    let text = fs::read_to_string(out.join("links.json")).unwrap();
    assert!(!text.contains('\n'));
    assert!(out.join("taxonomy.json").exists());
    assert!(!out.join("crossLevelConnections.json").exists());
}

#[test]
fn rebuild_replaces_previous_output() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());
    let out = work.path().join("site");
    let pipeline = pipeline_into(&out);

    pipeline.build(&inputs).unwrap();
    let first = fs::read_to_string(out.join("nodeMetadata.json")).unwrap();
    pipeline.build(&inputs).unwrap();
    let second = fs::read_to_string(out.join("nodeMetadata.json")).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_dir(&out).unwrap().count(), 6);
}

#[test]
fn failed_write_keeps_previous_output() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());
    let out = work.path().join("site");
    fs::create_dir_all(out.join("crossLevelConnections.json")).unwrap();
    fs::write(out.join("taxonomy.json"), "previous").unwrap();

    let err = pipeline_into(&out).build(&inputs).unwrap_err();
    assert!(format!("{err:#}").contains("crossLevelConnections.json"));
    assert_eq!(fs::read_to_string(out.join("taxonomy.json")).unwrap(), "previous");
    assert!(!out.join("nodeMetadata.json").exists());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 2, "staged files are cleaned up");
}

#[test]
fn check_reports_without_writing() {
    let work = TempDir::new().unwrap();
    let inputs = write_inputs(work.path());
    let out = work.path().join("site");

    let build = pipeline_into(&out).run(&inputs).unwrap();
    assert!(build.report.written.is_empty());
    assert!(build.report.connections > 0);
    assert!(build.artifact("platformConfiguration.json").is_some());
    assert!(!out.exists());
}
