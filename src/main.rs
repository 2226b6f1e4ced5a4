//! `pqt`: build a quadtree from a point file and query it.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use point_quadtree::{Config, Feature, Point, Quadtree, Rect, Region};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Text file with one `x,y` pair per line. Blank lines and `#` comments
    /// are skipped.
    points: PathBuf,
    /// TOML file with tree settings.
    #[clap(short, long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    operation: Operation,
}

#[derive(clap::Subcommand, Debug)]
enum Operation {
    /// Print the bounds and shape of the tree.
    Stats,
    /// Count the points inside a region.
    Count {
        #[clap(flatten)]
        region: RegionArgs,
    },
    /// Print the points inside a region, prefixed with their line number.
    List {
        #[clap(flatten)]
        region: RegionArgs,
    },
}

#[derive(clap::Args, Debug)]
struct RegionArgs {
    /// Axis-aligned box as `min_x,min_y,max_x,max_y`.
    #[clap(long, conflicts_with = "polygon", required_unless_present = "polygon")]
    bbox: Option<String>,
    /// Polygon exterior ring as `x y, x y, ...`.
    #[clap(long)]
    polygon: Option<String>,
}

impl RegionArgs {
    fn parse(&self) -> anyhow::Result<Box<dyn Region>> {
        match (&self.bbox, &self.polygon) {
            (Some(bbox), _) => Ok(Box::new(parse_bbox(bbox)?)),
            (None, Some(polygon)) => Ok(Box::new(parse_polygon(polygon)?)),
            (None, None) => bail!("either --bbox or --polygon is required"),
        }
    }
}

fn parse_number(text: &str) -> anyhow::Result<f64> {
    text.trim()
        .parse::<f64>()
        .with_context(|| format!("invalid number {text:?}"))
}

fn parse_points(text: &str) -> anyhow::Result<Vec<Point<usize>>> {
    let mut points = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .collect();
        let [x, y] = fields[..] else {
            bail!(
                "line {line_number}: expected 2 coordinates, got {}",
                fields.len()
            );
        };
        let x = parse_number(x).with_context(|| format!("line {line_number}"))?;
        let y = parse_number(y).with_context(|| format!("line {line_number}"))?;
        points.push(Point::with_data(x, y, line_number));
    }
    Ok(points)
}

fn parse_bbox(text: &str) -> anyhow::Result<Rect> {
    let bounds = text
        .split(',')
        .map(parse_number)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Rect::from_slice(&bounds)?)
}

fn parse_polygon(text: &str) -> anyhow::Result<Feature> {
    let mut ring = Vec::new();
    for vertex in text.split(',') {
        let coords: Vec<&str> = vertex.split_whitespace().collect();
        let [x, y] = coords[..] else {
            bail!("polygon vertex {vertex:?} must be `x y`");
        };
        ring.push((parse_number(x)?, parse_number(y)?));
    }
    if ring.len() < 3 {
        bail!("polygon needs at least 3 vertices, got {}", ring.len());
    }
    Ok(Feature::from_exterior(ring))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let text = std::fs::read_to_string(&args.points)
        .with_context(|| format!("reading {}", args.points.display()))?;
    let points = parse_points(&text)?;
    info!(
        points = points.len(),
        capacity = config.capacity,
        "building quadtree"
    );
    let tree = Quadtree::from_points_with(points, &config)?;

    match args.operation {
        Operation::Stats => {
            let stats = tree.stats();
            let (min_x, min_y, max_x, max_y) = tree.rect().bounds();
            println!("bounds:   {min_x} {min_y} {max_x} {max_y}");
            println!("points:   {}", tree.total_point_count());
            println!("leaves:   {}", stats.leaves);
            println!("branches: {}", stats.branches);
            println!("depth:    {}", stats.max_depth);
        }
        Operation::Count { region } => {
            let region = region.parse()?;
            println!("{}", tree.count_overlapping(region.as_ref()));
        }
        Operation::List { region } => {
            let region = region.parse()?;
            for point in tree.get_overlapping(region.as_ref()) {
                println!("{}\t{}\t{}", point.data, point.x, point.y);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_file() {
        let text = "# header\n0,0\n\n0.5 0.5\n  1.0,\t2.0  \n";
        let points = parse_points(text).unwrap();
        assert_eq!(
            points,
            vec![
                Point::with_data(0.0, 0.0, 2),
                Point::with_data(0.5, 0.5, 4),
                Point::with_data(1.0, 2.0, 5),
            ]
        );
    }

    #[test]
    fn bad_points_name_the_line() {
        let err = parse_points("0,0\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_points("0,zero\n").is_err());
    }

    #[test]
    fn bbox_argument() {
        assert_eq!(
            parse_bbox("0, 0, 1, 2").unwrap(),
            Rect::new(0.0, 0.0, 1.0, 2.0).unwrap()
        );
        assert!(parse_bbox("0,0,1").is_err());
        assert!(parse_bbox("1,0,0,1").is_err());
    }

    #[test]
    fn polygon_argument() {
        let feature = parse_polygon("0 0, 1 0, 1 1, 0 1").unwrap();
        let unit = Rect::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(feature.bounds(), Some(unit));
        assert!(parse_polygon("0 0, 1 1").is_err());
        assert!(parse_polygon("0 0 0, 1 0, 1 1").is_err());
    }

    #[test]
    fn args_parse() {
        let argv = ["pqt", "pts.txt", "count", "--bbox", "0,0,1,1"];
        let args = Args::try_parse_from(argv).unwrap();
        assert!(matches!(args.operation, Operation::Count { .. }));
        assert!(Args::try_parse_from(["pqt", "pts.txt", "count"]).is_err());
    }
}
