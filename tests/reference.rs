//! Compares unfold and fold against reference data written by
//! `scripts/generate_test_data.py`.

use approx::assert_abs_diff_eq;
use ndarray::{Array3, ArrayD};
use ndarray_npy::read_npy;
use unfold_rs::{fold, fold_backward, unfold, unfold_backward, DenseConvDims, Padding, WindowOptions};

struct Case {
    name: &'static str,
    kernel: Vec<usize>,
    options: WindowOptions,
}

fn load<T: ndarray_npy::ReadNpyExt>(case: &str, part: &str) -> T {
    let path = format!(
        "{}/tests/data/{}_{}.npy",
        env!("CARGO_MANIFEST_DIR"),
        case,
        part
    );
    read_npy(&path).unwrap_or_else(|e| panic!("could not read {}: {}", path, e))
}

fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "sequence",
            kernel: vec![3],
            options: WindowOptions::new()
                .stride(2)
                .padding(Padding::Asymmetric(vec![1, 2])),
        },
        Case {
            name: "image",
            kernel: vec![3, 2],
            options: WindowOptions::new()
                .stride([2, 1])
                .padding([1, 0])
                .dilation([1, 2])
                .flipped(true),
        },
        Case {
            name: "volume",
            kernel: vec![2, 3, 2],
            options: WindowOptions::new().padding(1),
        },
    ]
}

#[test]
fn unfold_matches_reference() {
    for case in cases() {
        let input: ArrayD<f64> = load(case.name, "input");
        let expected: Array3<f64> = load(case.name, "windows");
        let windows = unfold(&input, &case.kernel, &case.options).unwrap();
        assert_eq!(windows.shape(), expected.shape(), "{}", case.name);
        assert_abs_diff_eq!(windows, expected, epsilon = 1e-12);
    }
}

#[test]
fn fold_matches_reference() {
    for case in cases() {
        let upstream: Array3<f64> = load(case.name, "upstream");
        let expected: ArrayD<f64> = load(case.name, "folded");
        let folded = fold(&upstream, expected.shape(), &case.kernel, &case.options).unwrap();
        assert_eq!(folded.shape(), expected.shape(), "{}", case.name);
        assert_abs_diff_eq!(folded, expected, epsilon = 1e-12);
    }
}

#[test]
fn gradients_match_reference() {
    for case in cases() {
        let input: ArrayD<f64> = load(case.name, "input");
        let upstream: Array3<f64> = load(case.name, "upstream");
        let folded: ArrayD<f64> = load(case.name, "folded");
        let windows: Array3<f64> = load(case.name, "windows");
        let dims = DenseConvDims::new(input.shape(), &case.kernel, &case.options).unwrap();

        let dx = unfold_backward(&upstream, input.shape(), &dims).unwrap();
        assert_abs_diff_eq!(dx, folded, epsilon = 1e-12);

        let dw = fold_backward(&input, &dims).unwrap();
        assert_abs_diff_eq!(dw, windows, epsilon = 1e-12);
    }
}
