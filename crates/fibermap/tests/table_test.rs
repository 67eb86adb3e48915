//! Wiring table scenarios over propagated networks.

use fibermap::{
    config::TableConfig,
    network::{CableSegment, DistributionBox, Level, OriginPoint, PortRange},
    propagate::propagate_all,
    table::{FiberRow, WiringTable, WiringTableBuilder},
};
use fibermap_store::MemoryRepository;

fn build(repo: &mut MemoryRepository) -> WiringTable {
    propagate_all(repo).expect("propagation");
    let config = TableConfig::default();
    let origin = OriginPoint::new("SRO-01");
    let (table, issues) = WiringTableBuilder::new(&*repo, &config)
        .build(&origin)
        .expect("table");
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    table
}

#[test]
fn twenty_four_fibres_fill_two_tubes() {
    let mut repo = MemoryRepository::new()
        .with_origin(OriginPoint::new("SRO-01"))
        .with_segment(
            CableSegment::first("C-1", "S-1", "SRO-01", Level::One, PortRange::new(1, 24))
                .with_extremity("B-1")
                .with_type("CABLE 24FO"),
        )
        .with_box(DistributionBox::new("B-1", "S-1", PortRange::new(1, 24)).with_type("BPE"));

    let table = build(&mut repo);

    let fibres: Vec<&FiberRow> = table.fibers_of(Level::One).collect();
    assert_eq!(fibres.len(), 24);
    assert_eq!(fibres.first().map(|f| f.row), Some(4));
    assert_eq!(fibres.last().map(|f| f.row), Some(27));
    for (i, fibre) in fibres.iter().enumerate() {
        let number = i as u32 + 1;
        assert_eq!(fibre.number, number);
        assert_eq!(fibre.tube, if number <= 12 { 1 } else { 2 });
        assert_eq!(fibre.fiber, (number - 1) % 12 + 1);
    }

    let ports: Vec<(u32, u32)> = table.box_ports().iter().map(|p| (p.row, p.number)).collect();
    assert_eq!(ports.len(), 24);
    assert_eq!(ports.first(), Some(&(4, 1)));
    assert_eq!(ports.last(), Some(&(27, 24)));

    assert_eq!(table.trunk().len(), 24);
    assert_eq!(table.trunk()[23].origin_port, 24);
    assert_eq!(table.trunk()[23].odf_code(), "ODF01");
}

#[test]
fn chained_section_fills_contiguous_rows() {
    let first = CableSegment::first("N-1", "S-9", "B-1", Level::Three, PortRange::new(1, 8))
        .with_extremity("X");
    let second = CableSegment::continuation(&first, "N-2", "X").with_extremity("Y");
    let mut repo = MemoryRepository::new()
        .with_origin(OriginPoint::new("SRO-01"))
        .with_segment(
            CableSegment::first("C-1", "S-1", "SRO-01", Level::One, PortRange::new(1, 24))
                .with_extremity("B-1"),
        )
        .with_box(DistributionBox::new("B-1", "S-1", PortRange::new(1, 24)))
        .with_segment(first)
        .with_segment(second)
        .with_box(DistributionBox::new("X", "S-9", PortRange::new(1, 4)))
        .with_box(DistributionBox::new("Y", "S-9", PortRange::new(5, 8)));

    let table = build(&mut repo);

    let chain: Vec<&FiberRow> = table.fibers_of(Level::Three).collect();
    let rows: Vec<u32> = chain.iter().map(|f| f.row).collect();
    assert_eq!(rows, (4..12).collect::<Vec<_>>());

    let labels: Vec<&str> = chain
        .iter()
        .filter_map(|f| f.termination.as_deref())
        .collect();
    assert_eq!(
        labels,
        vec!["X-01", "X-02", "X-03", "X-04", "Y-05", "Y-06", "Y-07", "Y-08"]
    );
    assert_eq!(chain[4].number, 5);
}

#[test]
fn odf_numbering_wraps_across_cables() {
    let config = TableConfig::new(4, 12, 10);
    let mut repo = MemoryRepository::new()
        .with_origin(OriginPoint::new("SRO-01"))
        .with_segment(CableSegment::first(
            "C-1",
            "S-1",
            "SRO-01",
            Level::One,
            PortRange::new(1, 12),
        ))
        .with_segment(CableSegment::first(
            "C-2",
            "S-2",
            "SRO-01",
            Level::One,
            PortRange::new(13, 18),
        ));
    propagate_all(&mut repo).expect("propagation");

    let (table, _) = WiringTableBuilder::new(&repo, &config)
        .build(&OriginPoint::new("SRO-01"))
        .expect("table");

    let trunk = table.trunk();
    assert_eq!(trunk.len(), 18);
    assert_eq!((trunk[11].odf, trunk[11].odf_port), (1, 12));
    assert_eq!((trunk[12].odf, trunk[12].odf_port), (2, 1));
    assert_eq!(trunk[12].row, 16);
    assert_eq!(trunk[17].origin_port, 18);
}
