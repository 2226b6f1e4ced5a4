use point_quadtree::{Config, Coord, Feature, NodeKind, NodeRef, Point, Quadtree, Rect, Region};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(rng: &mut StdRng, n: usize) -> Vec<Point<usize>> {
    (0..n)
        .map(|i| {
            // Snap to a coarse grid so repeated coordinates show up.
            let x = (rng.random_range(0.0..100.0_f64) * 4.0).round() / 4.0;
            let y = (rng.random_range(0.0..50.0_f64) * 4.0).round() / 4.0;
            Point::with_data(x, y, i)
        })
        .collect()
}

fn random_rect(rng: &mut StdRng) -> Rect {
    let x0 = rng.random_range(-10.0..110.0);
    let y0 = rng.random_range(-10.0..60.0);
    let w = rng.random_range(0.0..60.0);
    let h = rng.random_range(0.0..30.0);
    Rect::new(x0, y0, x0 + w, y0 + h).unwrap()
}

fn random_triangle(rng: &mut StdRng) -> Feature {
    let mut vertex = || (rng.random_range(-10.0..110.0), rng.random_range(-10.0..60.0));
    Feature::from_exterior([vertex(), vertex(), vertex()])
}

fn brute_force<R: Region>(points: &[Point<usize>], region: &R) -> usize {
    points
        .iter()
        .filter(|p| region.contains_coord(Coord::new(p.x, p.y)))
        .count()
}

// Leaves at `max_depth` never split, so only shallower leaves are bounded by capacity.
fn check_node(node: NodeRef<'_, Point<usize>>, config: &Config) {
    match node.children() {
        Some(children) => {
            assert_eq!(node.kind(), NodeKind::Branch);
            assert!(node.records().is_empty(), "branch holds no records");
            let sum: usize = children.iter().map(|c| c.total_point_count()).sum();
            assert_eq!(
                node.total_point_count(),
                sum,
                "branch count is the sum of its children"
            );
            for child in children {
                assert!(
                    node.rect().contains_rect(&child.rect()),
                    "child inside parent"
                );
                check_node(child, config);
            }
        }
        None => {
            assert_eq!(node.total_point_count(), node.records().len());
            if node.depth() < config.max_depth {
                assert!(
                    node.distinct_coords().len() <= config.capacity,
                    "leaf within capacity"
                );
            }
            for record in node.records() {
                assert!(node.contains_coords(record), "record inside its leaf");
            }
        }
    }
}

#[test]
fn construction_keeps_every_point() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [1, 2, 10, 500, 3000] {
        let points = random_points(&mut rng, n);
        let tree = Quadtree::from_points(points.clone()).unwrap();
        assert_eq!(tree.total_point_count(), n);
        assert_eq!(tree.all_points().len(), n);
        assert_eq!(tree.walk().count(), n);
        assert_eq!(tree.stats().records, n);

        let mut ids: Vec<_> = tree.all_points().iter().map(|p| p.data).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn structure_invariants() {
    let mut rng = StdRng::seed_from_u64(11);
    for capacity in [1, 3, 11] {
        let points = random_points(&mut rng, 2000);
        let config = Config {
            capacity,
            ..Config::default()
        };
        let tree = Quadtree::from_points_with(points, &config).unwrap();
        check_node(tree.root(), &config);
    }
}

#[test]
fn capacity_stops_binding_at_max_depth() {
    let config = Config {
        capacity: 2,
        max_depth: 3,
    };
    // Twenty distinct points crowd into one cell a few levels down.
    let points: Vec<_> = (0..20_usize)
        .map(|i| Point::with_data(i as f64 * 0.001, i as f64 * 0.001, i))
        .chain([Point::with_data(100.0, 50.0, 20)])
        .collect();
    let tree = Quadtree::from_points_with(points, &config).unwrap();
    check_node(tree.root(), &config);
    assert_eq!(tree.total_point_count(), 21);
    assert_eq!(tree.stats().max_depth, 3);

    let mut crowded = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        match node.children() {
            Some(children) => stack.extend(children),
            None if node.distinct_coords().len() > config.capacity => crowded.push(node),
            None => {}
        }
    }
    assert_eq!(crowded.len(), 1);
    assert_eq!(crowded[0].depth(), config.max_depth);
    assert_eq!(crowded[0].total_point_count(), 20);
}

#[test]
fn count_matches_get_and_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    let points = random_points(&mut rng, 2000);
    let tree = Quadtree::from_points_with(
        points.clone(),
        &Config {
            capacity: 4,
            ..Config::default()
        },
    )
    .unwrap();

    for _ in 0..50 {
        let rect = random_rect(&mut rng);
        let count = tree.count_overlapping(&rect);
        assert_eq!(count, tree.get_overlapping(&rect).len());
        assert_eq!(count, brute_force(&points, &rect));
    }
    for _ in 0..20 {
        let triangle = random_triangle(&mut rng);
        let count = tree.count_overlapping(&triangle);
        assert_eq!(count, tree.get_overlapping(&triangle).len());
        assert_eq!(count, brute_force(&points, &triangle));
    }
}

#[test]
fn subdivide_conserves_count() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = random_points(&mut rng, 30);
    let bounds = Rect::new(0.0, 0.0, 100.0, 50.0).unwrap();
    let mut tree = Quadtree::new(bounds, 100).unwrap();
    for p in points {
        tree.insert(p).unwrap();
    }
    assert_eq!(tree.kind(), NodeKind::Leaf);

    let before = tree.total_point_count();
    tree.subdivide(tree.root().id()).unwrap();
    assert_eq!(tree.total_point_count(), before);
    assert_eq!(tree.all_points().len(), before);
}

#[test]
fn covering_and_disjoint_regions() {
    let mut rng = StdRng::seed_from_u64(5);
    let tree = Quadtree::from_points(random_points(&mut rng, 1000)).unwrap();
    let (x0, y0, x1, y1) = tree.rect().bounds();

    let covering = Rect::new(x0 - 1.0, y0 - 1.0, x1 + 1.0, y1 + 1.0).unwrap();
    assert_eq!(tree.count_overlapping(&covering), tree.total_point_count());
    assert_eq!(
        tree.count_overlapping(&Feature::from_rect(covering)),
        tree.total_point_count()
    );

    let disjoint = Rect::new(x1 + 1.0, y1 + 1.0, x1 + 2.0, y1 + 2.0).unwrap();
    assert_eq!(tree.count_overlapping(&disjoint), 0);
    let disjoint = Feature::from_rect(disjoint);
    assert!(tree.get_overlapping(&disjoint).is_empty());
}

#[test]
fn concurrent_readers() {
    let mut rng = StdRng::seed_from_u64(9);
    let points = random_points(&mut rng, 2000);
    let tree = Quadtree::from_points(points.clone()).unwrap();
    let regions: Vec<Rect> = (0..8).map(|_| random_rect(&mut rng)).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = regions
            .iter()
            .map(|region| {
                let tree = &tree;
                scope.spawn(move || {
                    (
                        tree.count_overlapping(region),
                        tree.get_overlapping(region).len(),
                    )
                })
            })
            .collect();
        for (handle, region) in handles.into_iter().zip(&regions) {
            let (count, listed) = handle.join().unwrap();
            assert_eq!(count, listed);
            assert_eq!(count, brute_force(&points, region));
        }
    });
}
