//! ラスタのポリゴン化
//!
//! 同じ値を持つ4連結の領域ごとに1つのポリゴンを生成する。穴は内側リングとして表現する。
//! 出力順は各領域の最初のピクセルのラスタ走査順で、同じ入力に対して常に同じになる。

use geo::orient::{Direction, Orient};
use geo::{Coord, LineString, Polygon};
use std::collections::{HashMap, VecDeque};

use crate::raster::{GeoTransform, Raster};

/// ポリゴン化の結果1件
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geometry: Polygon<f64>,
    pub value: f64,
}

pub fn shapes(raster: &Raster) -> Vec<Shape> {
    polygonize(&raster.values, raster.width, raster.height, &raster.transform)
}

pub fn polygonize(
    values: &[f64],
    width: usize,
    height: usize,
    transform: &GeoTransform,
) -> Vec<Shape> {
    let (labels, regions) = label_regions(values, width, height);

    let shapes: Vec<Shape> = regions
        .iter()
        .enumerate()
        .filter_map(|(label, region)| {
            let rings = trace_rings(&region.pixels, &labels, label, width, height);
            assemble_polygon(rings, transform).map(|geometry| Shape {
                geometry,
                value: region.value,
            })
        })
        .collect();

    tracing::debug!(
        "Polygonized {} x {} raster into {} shapes",
        width,
        height,
        shapes.len()
    );

    shapes
}

struct Region {
    value: f64,
    pixels: Vec<(usize, usize)>,
}

fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// 4連結ラベリング。戻り値はピクセルごとのラベルと、ラベル順の領域一覧
fn label_regions(values: &[f64], width: usize, height: usize) -> (Vec<usize>, Vec<Region>) {
    let mut labels = vec![usize::MAX; width * height];
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..width * height {
        if labels[start] != usize::MAX {
            continue;
        }

        let label = regions.len();
        let value = values[start];
        let mut pixels = Vec::new();

        labels[start] = label;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            let (row, col) = (idx / width, idx % width);
            pixels.push((row, col));

            let mut visit = |n: usize| {
                if labels[n] == usize::MAX && same_value(values[n], value) {
                    labels[n] = label;
                    queue.push_back(n);
                }
            };
            if row > 0 {
                visit(idx - width);
            }
            if col + 1 < width {
                visit(idx + 1);
            }
            if row + 1 < height {
                visit(idx + width);
            }
            if col > 0 {
                visit(idx - 1);
            }
        }

        // 走査順に並べ替えてリング追跡の開始点を安定させる
        pixels.sort_unstable();
        regions.push(Region { value, pixels });
    }

    (labels, regions)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    East,
    South,
    West,
    North,
}

impl Dir {
    fn step(self, (x, y): (usize, usize)) -> (usize, usize) {
        match self {
            Dir::East => (x + 1, y),
            Dir::South => (x, y + 1),
            Dir::West => (x - 1, y),
            Dir::North => (x, y - 1),
        }
    }

    // 画面座標（y下向き）での左折
    fn left(self) -> Self {
        match self {
            Dir::East => Dir::North,
            Dir::North => Dir::West,
            Dir::West => Dir::South,
            Dir::South => Dir::East,
        }
    }

    fn right(self) -> Self {
        self.left().left().left()
    }
}

type Vertex = (usize, usize);

/// 領域の境界辺をたどってリングを作る（ピクセル角の座標、x=列, y=行）
///
/// 各辺は領域の内部が進行方向の右手に来る向きを持つ。外周は正、穴は負の面積になる。
fn trace_rings(
    pixels: &[(usize, usize)],
    labels: &[usize],
    label: usize,
    width: usize,
    height: usize,
) -> Vec<Vec<Vertex>> {
    let inside = |row: usize, col: usize| labels[row * width + col] == label;

    let mut edges: Vec<(Vertex, Dir)> = Vec::new();
    for &(row, col) in pixels {
        if row == 0 || !inside(row - 1, col) {
            edges.push(((col, row), Dir::East));
        }
        if col + 1 == width || !inside(row, col + 1) {
            edges.push(((col + 1, row), Dir::South));
        }
        if row + 1 == height || !inside(row + 1, col) {
            edges.push(((col + 1, row + 1), Dir::West));
        }
        if col == 0 || !inside(row, col - 1) {
            edges.push(((col, row + 1), Dir::North));
        }
    }

    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (i, &(start, _)) in edges.iter().enumerate() {
        outgoing.entry(start).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let (origin, first_dir) = edges[first];
        let mut steps = vec![(origin, first_dir)];
        let mut current = first_dir.step(origin);
        let mut dir = first_dir;

        loop {
            // 分岐点では左折を優先し、各リングが自己接触しないようにする
            let candidates = outgoing.get(&current).map(Vec::as_slice).unwrap_or(&[]);
            let next = [dir.left(), dir, dir.right()].into_iter().find_map(|want| {
                candidates
                    .iter()
                    .copied()
                    .find(|&e| edges[e].1 == want && (!used[e] || e == first))
            });

            match next {
                Some(e) if e == first => break,
                Some(e) => {
                    used[e] = true;
                    dir = edges[e].1;
                    steps.push((current, dir));
                    current = dir.step(current);
                }
                None => {
                    tracing::warn!("Unclosed boundary ring at vertex {:?}", current);
                    break;
                }
            }
        }

        // 直線上の頂点を除去
        let ring: Vec<Vertex> = steps
            .iter()
            .enumerate()
            .filter(|&(i, &(_, out))| {
                let incoming = steps[(i + steps.len() - 1) % steps.len()].1;
                incoming != out
            })
            .map(|(_, &(v, _))| v)
            .collect();

        if ring.len() >= 4 {
            rings.push(ring);
        }
    }

    rings
}

fn signed_area(ring: &[Vertex]) -> i64 {
    let n = ring.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
        })
        .sum();
    twice / 2
}

fn to_line_string(ring: &[Vertex], transform: &GeoTransform) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|&(x, y)| {
            let (gx, gy) = transform.apply(x as f64, y as f64);
            Coord { x: gx, y: gy }
        })
        .collect();
    if let Some(&first) = coords.first() {
        coords.push(first);
    }
    LineString::new(coords)
}

fn assemble_polygon(rings: Vec<Vec<Vertex>>, transform: &GeoTransform) -> Option<Polygon<f64>> {
    let (mut shells, holes): (Vec<_>, Vec<_>) =
        rings.into_iter().partition(|ring| signed_area(ring) > 0);

    // 4連結の領域なので外周は1本
    debug_assert!(shells.len() <= 1, "region produced {} shells", shells.len());
    let shell = shells.pop()?;

    let exterior = to_line_string(&shell, transform);
    let interiors = holes
        .iter()
        .map(|hole| to_line_string(hole, transform))
        .collect();

    Some(Polygon::new(exterior, interiors).orient(Direction::Default))
}
