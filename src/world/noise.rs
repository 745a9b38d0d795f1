// Classic 2-D gradient (Perlin) noise. The permutation table is drawn from
// the caller's RNG so a seeded game always produces the same terrain.
use rand::Rng;

const GRAD: [(f64, f64); 12] = [
    (1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0),
    (1.0, 0.0), (-1.0, 0.0), (1.0, 0.0), (-1.0, 0.0),
    (0.0, 1.0), (0.0, -1.0), (0.0, 1.0), (0.0, -1.0),
];

pub struct Perlin {
    perm: [u8; 512],
}

impl Perlin {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut perm = [0u8; 512];
        for i in 0..256 {
            perm[i] = rng.r#gen();
        }
        for i in 256..512 {
            perm[i] = perm[i & 255];
        }
        Self { perm }
    }

    fn hash(&self, x: usize, y: usize) -> usize {
        self.perm[self.perm[x & 255] as usize + (y & 255)] as usize
    }

    /// Noise value, roughly in `[-1, 1]`; exactly 0 on integer lattice points.
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let xi = x.floor() as i64 as usize & 255;
        let yi = y.floor() as i64 as usize & 255;
        let xf = x - x.floor();
        let yf = y - y.floor();

        let dot = |h: usize, dx: f64, dy: f64| {
            let (gx, gy) = GRAD[h % GRAD.len()];
            gx * dx + gy * dy
        };
        let top_right = dot(self.hash(xi + 1, yi + 1), xf - 1.0, yf - 1.0);
        let top_left = dot(self.hash(xi, yi + 1), xf, yf - 1.0);
        let bottom_right = dot(self.hash(xi + 1, yi), xf - 1.0, yf);
        let bottom_left = dot(self.hash(xi, yi), xf, yf);

        let u = fade(xf);
        let v = fade(yf);
        let top = lerp(top_left, top_right, u);
        let bottom = lerp(bottom_left, bottom_right, u);
        lerp(bottom, top, v)
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}
