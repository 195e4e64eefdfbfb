//! Integration tests for DataSource over every input shape.

use data_source::{
    convert_project, export_flat_tables, ConversionOptions, DataSource, DataSourceConfig, DataSourceError,
    FrameSource,
};
use iric_common::{GridLocation, GridMode, StepFrame};
use iric_project::{InputKind, ProjectError};
use std::path::{Path, PathBuf};
use test_utils::{
    archive_files, assert_slice_approx_eq, counting_3x3_spec, temp_test_dir, two_step_spec, write_flat_table_dir,
    ContainerSpec, LocationEncoding, PointerTable, StepSpec,
};

fn depth_container(dir: &Path, name: &str, depth: f64) -> PathBuf {
    let path = dir.join(name);
    ContainerSpec::regular(2, 2, 1.0, 1.0)
        .step(StepSpec::new("FlowSolution1").field("Depth", 2, 2, vec![depth; 4]))
        .write(&path)
        .unwrap();
    path
}

fn depth_of(frame: &StepFrame) -> f64 {
    frame.column("Depth").unwrap()[0]
}

#[test]
fn test_flat_tables_then_case_file_flips_kind() {
    let dir = temp_test_dir();
    write_flat_table_dir(dir.path(), &[1, 2, 3, 4, 5], 2, 3).unwrap();

    let source = DataSource::from_input(dir.path(), GridMode::Node).unwrap();
    assert_eq!(source.kind(), InputKind::FlatTableSeries);
    assert_eq!(source.steps(), &[1, 2, 3, 4, 5]);
    assert_eq!(source.list_value_columns(), vec!["Depth"]);
    let b = source.domain_bounds().unwrap();
    assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (0.0, 2.0, 0.0, 1.0));

    let frame = source.get_frame(3, &["Depth"]).unwrap();
    assert_eq!(frame.step, 3);
    assert_eq!(frame.time, 3.0);
    assert_eq!(depth_of(&frame), 3.0);

    let depths: Vec<f64> = source
        .iter_frames(&["Depth", "Depth", ""])
        .unwrap()
        .map(|f| depth_of(&f.unwrap()))
        .collect();
    assert_eq!(depths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    counting_3x3_spec().write(&dir.path().join("Case1.cgn")).unwrap();
    let source = DataSource::from_input(dir.path(), GridMode::Node).unwrap();
    assert_eq!(source.kind(), InputKind::SingleContainer);
    assert_eq!(source.list_value_columns(), vec!["H"]);
}

#[test]
fn test_single_container_frames() {
    let dir = temp_test_dir();
    let path = dir.path().join("Case1.cgn");
    two_step_spec().write(&path).unwrap();

    let source = DataSource::from_input(&path, GridMode::Node).unwrap();
    assert_eq!(source.steps(), &[1, 2]);
    assert_eq!(source.list_value_columns(), vec!["V"]);
    assert_eq!(source.container_paths(), vec![path.as_path()]);

    let second = source.get_frame(2, &["V"]).unwrap();
    assert_eq!(second.step, 2);
    assert_eq!(second.time, 10.0);
    assert_eq!(second.location, Some(GridLocation::Vertex));
    assert!(second.column("V").unwrap()[0].is_nan());

    assert!(matches!(
        source.get_frame(5, &["V"]),
        Err(DataSourceError::NoFrames { step: 5, .. })
    ));
    assert!(matches!(
        source.get_frame(-1, &["V"]),
        Err(DataSourceError::NoFrames { .. })
    ));

    let frames: Vec<StepFrame> = source.iter_frames::<&str>(&[]).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].table.column_names(), vec!["V"]);
}

#[test]
fn test_container_series_archive() {
    let dir = temp_test_dir();
    let sources: Vec<(String, PathBuf)> = [1, 2, 10]
        .iter()
        .map(|n| {
            let name = format!("Solution{}.cgn", n);
            let path = depth_container(dir.path(), &name, *n as f64);
            (format!("result/{}", name), path)
        })
        .collect();
    let members: Vec<(&str, &Path)> = sources.iter().map(|(n, p)| (n.as_str(), p.as_path())).collect();
    let archive = dir.path().join("project.ipro");
    archive_files(&archive, &members).unwrap();

    let mut source = DataSource::from_input(&archive, GridMode::Node).unwrap();
    assert_eq!(source.kind(), InputKind::ContainerSeries);
    assert_eq!(source.steps(), &[1, 2, 10]);
    assert_eq!(FrameSource::step_count(&source), 3);

    let exact = source.get_frame(10, &["Depth"]).unwrap();
    assert_eq!((exact.step, depth_of(&exact)), (10, 10.0));
    // Position 3, clamped past the end too.
    assert_eq!(source.get_frame(3, &["Depth"]).unwrap().step, 10);
    assert_eq!(source.get_frame(99, &["Depth"]).unwrap().step, 10);
    assert_eq!(source.get_frame(0, &["Depth"]).unwrap().step, 1);

    let steps: Vec<i64> = source
        .iter_frames(&["Depth"])
        .unwrap()
        .map(|f| f.unwrap().step)
        .collect();
    assert_eq!(steps, vec![1, 2, 10]);

    let extracted: Vec<PathBuf> = source.container_paths().iter().map(|p| p.to_path_buf()).collect();
    assert!(extracted.iter().all(|p| p.exists()));
    assert!(!extracted[0].starts_with(dir.path()));

    source.close().unwrap();
    assert!(source.is_closed());
    assert!(extracted.iter().all(|p| !p.exists()));
    source.close().unwrap();
}

#[test]
fn test_container_series_directory() {
    let dir = temp_test_dir();
    depth_container(dir.path(), "Solution2.cgn", 2.0);
    depth_container(dir.path(), "SolutionFinal.cgn", 7.0);

    let source = DataSource::from_input(dir.path(), GridMode::Node).unwrap();
    assert_eq!(source.kind(), InputKind::ContainerSeries);
    // The unnumbered member takes its position.
    assert_eq!(source.steps(), &[2, 2]);
    assert!(!source.is_closed());
    let depths: Vec<f64> = source
        .iter_frames(&["Depth"])
        .unwrap()
        .map(|f| depth_of(&f.unwrap()))
        .collect();
    assert_eq!(depths, vec![2.0, 7.0]);
}

#[test]
fn test_archive_case_is_removed_on_drop() {
    let dir = temp_test_dir();
    let case = dir.path().join("Case1.cgn");
    counting_3x3_spec().write(&case).unwrap();
    let archive = dir.path().join("project.ipro");
    archive_files(&archive, &[("Case1.cgn", case.as_path())]).unwrap();

    let source = DataSource::from_input(&archive, GridMode::Node).unwrap();
    assert_eq!(source.kind(), InputKind::SingleContainer);
    let extracted = source.container_paths()[0].to_path_buf();
    assert!(extracted.exists());
    assert_eq!(source.get_frame(1, &["H"]).unwrap().column("H").unwrap()[4], 5.0);

    drop(source);
    assert!(!extracted.exists());
}

#[test]
fn test_cell_mode_bounds_and_fields() {
    let dir = temp_test_dir();
    let path = dir.path().join("Case1.cgn");
    ContainerSpec::regular(3, 4, 1.0, 1.0)
        .step(
            StepSpec::new("FlowCellSolution1")
                .location("CellCenter", LocationEncoding::StringAttr)
                .field("Elevation", 2, 3, vec![1.0; 6]),
        )
        .step(StepSpec::new("FlowSolution1").field("Depth", 3, 4, vec![0.5; 12]))
        .pointers(PointerTable::Names(vec!["FlowSolution1".to_string()]))
        .write(&path)
        .unwrap();

    let cell = DataSource::from_input(&path, GridMode::Cell).unwrap();
    assert_eq!(cell.list_value_columns(), vec!["Elevation"]);
    let b = cell.domain_bounds().unwrap();
    assert_eq!((b.xmin, b.xmax, b.ymin, b.ymax), (0.5, 2.5, 0.5, 1.5));
    let frame = cell.get_frame(1, &["Elevation"]).unwrap();
    assert_eq!((frame.imax, frame.jmax), (3, 2));

    let node = DataSource::from_input(&path, GridMode::Node).unwrap();
    assert_eq!(node.list_value_columns(), vec!["Depth"]);
    assert_eq!(node.domain_bounds().unwrap().xmax, 3.0);
}

#[test]
fn test_export_round_trip() {
    let dir = temp_test_dir();
    let path = dir.path().join("Case1.cgn");
    two_step_spec().write(&path).unwrap();
    let source = DataSource::from_input(&path, GridMode::Node).unwrap();
    let original: Vec<StepFrame> = source.iter_frames(&["V"]).unwrap().collect::<Result<_, _>>().unwrap();

    let out = dir.path().join("csv");
    let written = export_flat_tables(source.iter_frames(&["V"]).unwrap(), &out).unwrap();
    assert_eq!(written.len(), 2);
    assert!(written[1].ends_with("Result_2.csv"));

    let exported = DataSource::from_input(&out, GridMode::Node).unwrap();
    assert_eq!(exported.kind(), InputKind::FlatTableSeries);
    let reread: Vec<StepFrame> = exported.iter_frames(&["V"]).unwrap().collect::<Result<_, _>>().unwrap();

    assert_eq!(reread.len(), original.len());
    for (a, b) in original.iter().zip(&reread) {
        assert_eq!((a.step, a.imax, a.jmax), (b.step, b.imax, b.jmax));
        assert_eq!(a.time, b.time);
        assert_eq!(a.table.i(), b.table.i());
        assert_eq!(a.table.j(), b.table.j());
        assert_slice_approx_eq!(a.table.x(), b.table.x(), 1e-12);
        assert_slice_approx_eq!(a.column("V").unwrap(), b.column("V").unwrap(), 1e-12);
    }
}

#[test]
fn test_convert_project_from_archive() {
    let dir = temp_test_dir();
    let case = dir.path().join("Renamed.cgn");
    counting_3x3_spec().write(&case).unwrap();
    let archive = dir.path().join("project.ipro");
    archive_files(&archive, &[("Renamed.cgn", case.as_path())]).unwrap();

    let out = dir.path().join("export");
    let options = ConversionOptions {
        fields: Some(vec!["H".to_string()]),
        ..ConversionOptions::default()
    };
    let returned = convert_project(&archive, &out, &options).unwrap();
    assert_eq!(returned, out);

    let text = std::fs::read_to_string(out.join("Result_1.csv")).unwrap();
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(lines[0], "iRIC output t = 0");
    assert_eq!(lines[1], "3,3");
    assert_eq!(lines[2], "I,J,X,Y,H");
    assert_eq!(lines[3], "1,1,0,0,1");
    assert_eq!(lines.len(), 3 + 9);
}

#[test]
fn test_construction_errors() {
    let dir = temp_test_dir();
    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, "x").unwrap();
    assert!(matches!(
        DataSource::from_input(&txt, GridMode::Node),
        Err(DataSourceError::Project(ProjectError::UnsupportedInput(_)))
    ));

    let empty = dir.path().join("empty");
    std::fs::create_dir(&empty).unwrap();
    assert!(matches!(
        DataSource::from_input(&empty, GridMode::Node),
        Err(DataSourceError::Project(ProjectError::NeitherProjectNorExported(_)))
    ));

    let bad_config = DataSourceConfig {
        case_name: String::new(),
        ..DataSourceConfig::default()
    };
    assert!(matches!(
        DataSource::from_input_with_config(dir.path(), &bad_config),
        Err(DataSourceError::Config(_))
    ));
}
