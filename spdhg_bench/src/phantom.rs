//! Ground truth image

/// Ellipses of the modified Shepp-Logan phantom:
/// intensity, semi-axes, center and rotation in degrees, on \\([-1, 1]^2\\).
const ELLIPSES: [(f64, f64, f64, f64, f64, f64); 10] = [
    ( 1.0, 0.6900, 0.9200,  0.00,  0.0000,   0.),
    (-0.8, 0.6624, 0.8740,  0.00, -0.0184,   0.),
    (-0.2, 0.1100, 0.3100,  0.22,  0.0000, -18.),
    (-0.2, 0.1600, 0.4100, -0.22,  0.0000,  18.),
    ( 0.1, 0.2100, 0.2500,  0.00,  0.3500,   0.),
    ( 0.1, 0.0460, 0.0460,  0.00,  0.1000,   0.),
    ( 0.1, 0.0460, 0.0460,  0.00, -0.1000,   0.),
    ( 0.1, 0.0460, 0.0230, -0.08, -0.6050,   0.),
    ( 0.1, 0.0230, 0.0230,  0.00, -0.6060,   0.),
    ( 0.1, 0.0230, 0.0460,  0.06, -0.6050,   0.),
];

/// Pixel size of an `nvoxel` by `nvoxel` grid on \\([-1, 1]^2\\).
pub fn cell_side(nvoxel: usize) -> f64
{
    2. / nvoxel as f64
}

/// Center \\((x, y)\\) of pixel `(r, c)`, row 0 being the top.
pub fn pixel_center(nvoxel: usize, r: usize, c: usize) -> (f64, f64)
{
    let h = cell_side(nvoxel);
    (-1. + (c as f64 + 0.5) * h, 1. - (r as f64 + 0.5) * h)
}

/// Nested ellipses phantom, row-major, values in \\([0, 1]\\).
pub fn phantom(nvoxel: usize) -> Vec<f64>
{
    let mut img = vec![0.; nvoxel * nvoxel];

    for r in 0.. nvoxel {
        for c in 0.. nvoxel {
            let (x, y) = pixel_center(nvoxel, r, c);

            let mut v = 0.;
            for &(val, a, b, x0, y0, phi) in ELLIPSES.iter() {
                let (s, co) = phi.to_radians().sin_cos();
                let dx = x - x0;
                let dy = y - y0;
                let u = (dx * co + dy * s) / a;
                let w = (-dx * s + dy * co) / b;
                if u * u + w * w <= 1. {
                    v += val;
                }
            }
            img[r * nvoxel + c] = v.max(0.).min(1.);
        }
    }

    img
}

#[test]
fn test_phantom1()
{
    let n = 16;
    let img = phantom(n);

    assert_eq!(img.len(), n * n);
    assert!(img.iter().all(|v| (0. ..= 1.).contains(v)));
    // corners are outside, center is inside
    assert_eq!(img[0], 0.);
    assert!(img[(n / 2) * n + n / 2] > 0.);
}
