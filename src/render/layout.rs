use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 640.0,
            margin: 32.0,
        }
    }
}

impl Canvas {
    fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    fn clamp(&self, p: Point) -> Point {
        Point {
            x: p.x.clamp(self.margin, (self.width - self.margin).max(self.margin)),
            y: p.y.clamp(self.margin, (self.height - self.margin).max(self.margin)),
        }
    }
}

const DEFAULT_ITERATIONS: usize = 300;
const MIN_DISTANCE: f64 = 0.01;

/// Fruchterman-Reingold layout for `node_count` nodes joined by `edges`
/// (index pairs; out-of-range pairs and self loops are ignored).
///
/// Starts from an even circle so the result is deterministic for a given input.
pub fn force_layout(node_count: usize, edges: &[(usize, usize)], canvas: Canvas) -> Vec<Point> {
    force_layout_with_iterations(node_count, edges, canvas, DEFAULT_ITERATIONS)
}

pub fn force_layout_with_iterations(
    node_count: usize,
    edges: &[(usize, usize)],
    canvas: Canvas,
    iterations: usize,
) -> Vec<Point> {
    if node_count == 0 {
        return Vec::new();
    }
    let center = canvas.center();
    if node_count == 1 {
        return vec![center];
    }

    let usable_w = (canvas.width - 2.0 * canvas.margin).max(1.0);
    let usable_h = (canvas.height - 2.0 * canvas.margin).max(1.0);
    let k = (usable_w * usable_h / node_count as f64).sqrt();
    let radius = usable_w.min(usable_h) / 3.0;

    let mut pos = (0..node_count)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / node_count as f64;
            Point {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect::<Vec<_>>();

    let edges = edges
        .iter()
        .copied()
        .filter(|&(a, b)| a != b && a < node_count && b < node_count)
        .collect::<Vec<_>>();

    let initial_temp = usable_w.min(usable_h) / 10.0;
    for step in 0..iterations {
        let mut disp = vec![Point { x: 0.0, y: 0.0 }; node_count];

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let (dx, dy, dist) = separation(pos[i], pos[j], i, j);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                disp[i].x += fx;
                disp[i].y += fy;
                disp[j].x -= fx;
                disp[j].y -= fy;
            }
        }

        for &(a, b) in &edges {
            let (dx, dy, dist) = separation(pos[a], pos[b], a, b);
            let force = dist * dist / k;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            disp[a].x -= fx;
            disp[a].y -= fy;
            disp[b].x += fx;
            disp[b].y += fy;
        }

        let temp = initial_temp * (1.0 - step as f64 / iterations as f64);
        for (p, d) in pos.iter_mut().zip(&disp) {
            let len = (d.x * d.x + d.y * d.y).sqrt();
            if len > 0.0 {
                let step_len = len.min(temp);
                p.x += d.x / len * step_len;
                p.y += d.y / len * step_len;
            }
            *p = canvas.clamp(*p);
        }
    }

    pos
}

// Coincident nodes are pulled apart along a direction derived from their indices.
fn separation(a: Point, b: Point, i: usize, j: usize) -> (f64, f64, f64) {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist >= MIN_DISTANCE {
        return (dx, dy, dist);
    }
    let angle = (i * 31 + j * 17) as f64;
    (MIN_DISTANCE * angle.cos(), MIN_DISTANCE * angle.sin(), MIN_DISTANCE)
}
