use bitpack::BitTable;
use frame_sim::io::{
    read_01, read_b8, read_dets, read_hits, read_r8, write_01_table, write_b8_table, write_dets_table, write_hits_table,
    write_r8_table, SampleLayout,
};

fn sample_table() -> BitTable {
    let mut t = BitTable::zeros(4, 12);
    for (shot, bits) in [&[0, 3, 7][..], &[][..], &[11][..], &[1, 2, 3, 4, 5][..]].into_iter().enumerate() {
        for &b in bits {
            t.set(shot, b, true);
        }
    }
    t
}

#[test]
fn every_table_format_round_trips_to_the_same_table() {
    let table = sample_table();
    let layout = SampleLayout { num_measurements: 4, num_detectors: 4, num_observables: 4 };

    let as_01 = write_01_table(&table);
    let as_hits = write_hits_table(&table);
    let as_dets = write_dets_table(&table, &layout);
    let as_b8 = write_b8_table(&table);
    let as_r8 = write_r8_table(&table);

    let mut from_01 = BitTable::zeros(table.major_len(), table.minor_len());
    for (shot, line) in as_01.lines().enumerate() {
        let row = read_01(line, table.minor_len()).unwrap();
        for c in 0..table.minor_len() {
            from_01.set(shot, c, row.get(c));
        }
    }
    assert_eq!(from_01, table);

    let mut from_hits = BitTable::zeros(table.major_len(), table.minor_len());
    for (shot, line) in as_hits.lines().enumerate() {
        let row = read_hits(line, table.minor_len()).unwrap();
        for c in 0..table.minor_len() {
            from_hits.set(shot, c, row.get(c));
        }
    }
    assert_eq!(from_hits, table);

    let mut from_dets = BitTable::zeros(table.major_len(), table.minor_len());
    for (shot, line) in as_dets.lines().enumerate() {
        let row = read_dets(line, &layout).unwrap();
        for c in 0..table.minor_len() {
            from_dets.set(shot, c, row.get(c));
        }
    }
    assert_eq!(from_dets, table);

    let bytes_per_shot = table.minor_len().div_ceil(8);
    let mut from_b8 = BitTable::zeros(table.major_len(), table.minor_len());
    for shot in 0..table.major_len() {
        let chunk = &as_b8[shot * bytes_per_shot..(shot + 1) * bytes_per_shot];
        let row = read_b8(chunk, table.minor_len()).unwrap();
        for c in 0..table.minor_len() {
            from_b8.set(shot, c, row.get(c));
        }
    }
    assert_eq!(from_b8, table);

    let mut from_r8 = BitTable::zeros(table.major_len(), table.minor_len());
    let mut cursor = 0;
    for shot in 0..table.major_len() {
        let start = cursor;
        let mut pos = 0usize;
        loop {
            let byte = as_r8[cursor];
            pos += byte as usize;
            cursor += 1;
            if byte < 255 {
                if pos >= table.minor_len() {
                    break;
                }
                pos += 1;
            }
        }
        let row = read_r8(&as_r8[start..cursor], table.minor_len()).unwrap();
        for c in 0..table.minor_len() {
            from_r8.set(shot, c, row.get(c));
        }
    }
    assert_eq!(from_r8, table);
}
