use ndarray::{Array2, array};

use super::*;
use crate::index::index_map::build_index_map;

fn cross() -> Mask {
    Mask::from_array(array![
        [true, false, true],
        [false, false, false],
        [true, false, true]
    ])
}

fn corners() -> Mask {
    Mask::from_array(array![
        [false, true, false],
        [true, true, true],
        [false, true, false]
    ])
}

fn numbered(h: usize, w: usize) -> Kernel {
    Kernel::new(Array2::from_shape_fn((h, w), |(r, c)| (r * w + c + 1) as f64)).unwrap()
}

fn padded(valid: &[i64], width: usize) -> Vec<i64> {
    let mut row = valid.to_vec();
    row.resize(width, NO_ORDINAL);
    row
}

fn padded_f(valid: &[f64], width: usize) -> Vec<f64> {
    let mut row = valid.to_vec();
    row.resize(width, NO_WEIGHT);
    row
}

fn primary(mask: &Mask, kernel: &Kernel) -> FrameTable {
    let (map, _) = build_index_map(mask);
    build_frames(map.coords(), mask, &map, kernel)
}

#[test]
fn cross_mask_rows() {
    let table = primary(&cross(), &Kernel::new(Array2::ones((3, 3))).unwrap());
    assert_eq!(table.rows(), 5);
    assert_eq!(table.width(), 9);
    let expected: [&[i64]; 5] = [
        &[0, 1, 2, 3],
        &[0, 1, 2, 4],
        &[0, 1, 2, 3, 4],
        &[0, 2, 3, 4],
        &[1, 2, 3, 4],
    ];
    for (i, valid) in expected.iter().enumerate() {
        assert_eq!(table.raw_row(i).0, padded(valid, 9).as_slice(), "row {i}");
    }
    assert_eq!(table.lengths(), &[4, 4, 5, 4, 4]);
}

#[test]
fn wide_kernel_loses_top_and_bottom_rows() {
    let table = primary(&Mask::unmasked((3, 3)), &numbered(3, 5));
    assert_eq!(table.width(), 15);
    assert_eq!(table.lengths(), &[6, 6, 6, 9, 9, 9, 6, 6, 6]);

    assert_eq!(table.raw_row(0).0, padded(&[0, 1, 2, 3, 4, 5], 15).as_slice());
    assert_eq!(
        table.raw_row(4).0,
        padded(&[0, 1, 2, 3, 4, 5, 6, 7, 8], 15).as_slice()
    );
    assert_eq!(table.raw_row(8).0, padded(&[3, 4, 5, 6, 7, 8], 15).as_slice());

    assert_eq!(
        table.raw_row(0).1,
        padded_f(&[8.0, 9.0, 10.0, 13.0, 14.0, 15.0], 15).as_slice()
    );
    assert_eq!(
        table.raw_row(3).1,
        padded_f(&[3.0, 4.0, 5.0, 8.0, 9.0, 10.0, 13.0, 14.0, 15.0], 15).as_slice()
    );
    assert_eq!(
        table.raw_row(8).1,
        padded_f(&[1.0, 2.0, 3.0, 6.0, 7.0, 8.0], 15).as_slice()
    );
}

#[test]
fn tall_kernel_loses_left_and_right_columns() {
    let table = primary(&Mask::unmasked((3, 3)), &numbered(5, 3));
    assert_eq!(table.lengths(), &[6, 9, 6, 6, 9, 6, 6, 9, 6]);
    assert_eq!(table.raw_row(0).0, padded(&[0, 1, 3, 4, 6, 7], 15).as_slice());
    assert_eq!(table.raw_row(5).0, padded(&[1, 2, 4, 5, 7, 8], 15).as_slice());
    assert_eq!(
        table.raw_row(0).1,
        padded_f(&[8.0, 9.0, 11.0, 12.0, 14.0, 15.0], 15).as_slice()
    );
    assert_eq!(
        table.raw_row(7).1,
        padded_f(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 15).as_slice()
    );
}

#[test]
fn blurring_rows_target_only_the_primary_mask() {
    let mask = cross();
    let (map, _) = build_index_map(&mask);
    let (blurring_map, blurring_count) = build_index_map(&corners());
    assert_eq!(blurring_count, 4);

    let table = build_blurring_frames(&blurring_map, &mask, &map, &numbered(3, 3));
    assert_eq!(table.rows(), 4);
    assert_eq!(table.lengths(), &[3, 3, 3, 3]);
    assert_eq!(table.row(0), (&[0i64, 1, 2][..], &[6.0, 8.0, 9.0][..]));
    assert_eq!(table.row(1), (&[0i64, 2, 3][..], &[4.0, 7.0, 8.0][..]));
    assert_eq!(table.row(2), (&[1i64, 2, 4][..], &[2.0, 3.0, 6.0][..]));
    assert_eq!(table.row(3), (&[2i64, 3, 4][..], &[1.0, 2.0, 4.0][..]));
}

#[test]
fn blurring_rows_with_5x5_kernel() {
    let mask = cross();
    let (map, _) = build_index_map(&mask);
    let (blurring_map, _) = build_index_map(&corners());

    let table = build_blurring_frames(&blurring_map, &mask, &map, &numbered(5, 5));
    assert_eq!(table.lengths(), &[5, 5, 5, 5]);
    for i in 0..4 {
        assert_eq!(table.row(i).0, &[0, 1, 2, 3, 4]);
    }
    assert_eq!(table.row(0).1, &[14.0, 18.0, 19.0, 20.0, 24.0]);
    assert_eq!(table.row(1).1, &[12.0, 16.0, 17.0, 18.0, 22.0]);
    assert_eq!(table.row(2).1, &[4.0, 8.0, 9.0, 10.0, 14.0]);
    assert_eq!(table.row(3).1, &[2.0, 6.0, 7.0, 8.0, 12.0]);
    assert_eq!(table.raw_row(3).1[5..], [NO_WEIGHT; 20]);
}

#[test]
fn scatter_uses_lengths_not_sentinels() {
    let table = primary(&Mask::unmasked((1, 3)), &numbered(1, 3));
    let mut out = vec![0.0; 3];
    table.scatter_into(&[1.0, 0.0, 0.0], &mut out);
    assert_eq!(out, vec![2.0, 3.0, 0.0]);
    assert_eq!(table.total_entries(), 2 + 3 + 2);
}

#[test]
fn parallel_build_matches_serial_build() {
    let mask = Mask::circular((23, 19), 8.5);
    let kernel = numbered(5, 7);
    let (map, _) = build_index_map(&mask);
    let serial = build_frames(map.coords(), &mask, &map, &kernel);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(3)
        .build()
        .unwrap();
    for chunk_rows in [1, 7, 64] {
        let parallel = build_table(
            "frames",
            map.coords(),
            &mask,
            &map,
            &kernel,
            Some(ParallelBuild {
                pool: &pool,
                chunk_rows,
            }),
        );
        assert_eq!(parallel, serial, "chunk_rows = {chunk_rows}");
    }
}

#[test]
fn empty_mask_builds_empty_table() {
    let table = primary(&Mask::fully_masked((4, 4)), &numbered(3, 3));
    assert_eq!(table.rows(), 0);
    assert_eq!(table.width(), 9);
    assert_eq!(table.total_entries(), 0);
}
