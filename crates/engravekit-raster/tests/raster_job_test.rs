use engravekit_core::{Command, CommandKind, LaserProperty};
use engravekit_raster::{
    BlackWhiteImage, DirectionMode, GreyImage, GreyscaleImage, LinearPowerMapper,
    RasterJobPart, RasterSettings, ScanAxis, ScanPolicy, ToolpathScanner, ToolpathStats,
};

#[test]
fn test_black_white_boundary() {
    let mut image = BlackWhiteImage::new(2, 1).unwrap();
    image.set_black(0, 0, true);
    let part = RasterJobPart::from_image(image, LaserProperty::engraving(), 500.0).unwrap();
    let mapper = LinearPowerMapper::with_max_power(100.0).unwrap();
    let policy = ScanPolicy::default().with_direction(DirectionMode::Unidirectional);

    let stream = part.to_command_stream(policy, &mapper).unwrap();
    let commands = stream.commands();

    let transitions: Vec<usize> = commands
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, c)| c.kind() == CommandKind::SetProperty)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(transitions.len(), 1);

    let cuts: Vec<&Command> = commands
        .iter()
        .filter(|c| c.kind() == CommandKind::LineTo)
        .collect();
    assert_eq!(cuts, vec![&Command::LineTo { x: 1, y: 0 }]);
    assert_eq!(transitions[0] + 1, commands.len() - 1);
}

#[test]
fn test_settings_to_stream() {
    let settings = RasterSettings::from_toml_str(
        r#"
        dpi = 254.0
        overscan = 0.2
        max_power = 50.0
        speed = 80.0
        "#,
    )
    .unwrap();

    let mut image = GreyImage::new(10, 3).unwrap();
    image.fill_with(|x, y| if y == 1 && (3..7).contains(&x) { 0 } else { 255 });

    let part = RasterJobPart::from_image(image, settings.initial_property().unwrap(), settings.dpi)
        .unwrap()
        .with_offset(20, 30);
    part.check_bed(100.0, 100.0).unwrap();

    let mapper = settings.mapper().unwrap();
    let stream = part
        .to_command_stream(settings.scan_policy(), &mapper)
        .unwrap();

    // overscan of 0.2 mm at 254 dpi is two pixels on either side of 3..7
    let row: Vec<i32> = stream
        .iter()
        .filter_map(Command::position)
        .filter(|&(_, y)| y == 31)
        .map(|(x, _)| x)
        .collect();
    assert_eq!(row, vec![21, 23, 27, 29]);

    let bounds = stream.bounds().unwrap();
    assert_eq!((bounds.min_x, bounds.max_x), (20, 29));
    assert_eq!((bounds.min_y, bounds.max_y), (30, 31));

    let mut stats = ToolpathStats::new();
    stream.deliver(&mut stats).unwrap();
    assert_eq!(stats.lines, 1);
    assert!((stats.cut_px - 4.0).abs() < 1e-9);
    assert!((stats.cut_mm().unwrap() - 0.4).abs() < 1e-9);
}

#[test]
fn test_vertical_serpentine_from_luma() {
    let luma = image::GrayImage::from_fn(3, 4, |x, _| image::Luma([if x == 1 { 255 } else { 0 }]));
    let image = BlackWhiteImage::from_luma(&luma).unwrap();
    let part = RasterJobPart::from_image(image, LaserProperty::engraving(), 500.0).unwrap();
    let mapper = LinearPowerMapper::with_max_power(100.0).unwrap();
    let policy = ScanPolicy::default().with_axis(ScanAxis::Vertical);

    let stream = part.to_command_stream(policy, &mapper).unwrap();
    let cuts: Vec<(i32, i32)> = stream
        .iter()
        .filter(|c| c.kind() == CommandKind::LineTo)
        .filter_map(Command::position)
        .collect();
    // column 0 downwards, column 1 skipped, column 2 keeps the upward sweep
    assert_eq!(cuts, vec![(0, 4), (2, 0)]);
}

#[test]
fn test_scanner_over_dyn_mapper() {
    let mut image = BlackWhiteImage::new(4, 1).unwrap();
    image.set_black(2, 0, true);
    let mapper = LinearPowerMapper::with_max_power(30.0).unwrap();
    let dyn_mapper: &dyn engravekit_raster::PropertyMapper = &mapper;
    let commands: Vec<String> = ToolpathScanner::new(image.buffer(), ScanPolicy::default(), dyn_mapper)
        .unwrap()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(commands.first().map(String::as_str), Some("MOVETO 0 0"));
    assert_eq!(commands.last().map(String::as_str), Some("LINETO 3 0"));
}
