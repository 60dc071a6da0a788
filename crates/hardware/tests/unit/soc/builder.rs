//! Topology builder tests.
//!
//! Verifies parameter validation, node multiplicities for every core count, and the fixed
//! parameters of the caches, buses, memory, and workload.

use std::path::PathBuf;

use armfs_core::common::{BuildError, ByteSize, Frequency, Latency, UnitError};
use armfs_core::core::{AccessKind, CpuModel};
use armfs_core::power::PowerModel;
use armfs_core::soc::builder::{IOBRIDGE_DELAY, L1_GEOMETRY, L2_GEOMETRY, MEMBUS_WIDTH};
use armfs_core::soc::clock::DomainHandle;
use armfs_core::soc::devices::{PlatformKind, VirtioSlot};
use armfs_core::soc::interconnect::{BusHandle, CrossbarKind, Endpoint, Port, PortSide};
use armfs_core::soc::memory::MemoryMode;
use armfs_core::soc::memory::controller::DramInterface;
use armfs_core::{BuildParameters, build};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::params;

// ══════════════════════════════════════════════════════════
// 1. Validation
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i64::MIN)]
fn non_positive_core_count_is_rejected(#[case] num_cpus: i64) {
    assert_eq!(
        build(&params(num_cpus)),
        Err(BuildError::InvalidCpuCount(num_cpus))
    );
}

#[test]
fn missing_images_are_rejected() {
    let no_kernel = BuildParameters {
        kernel: PathBuf::new(),
        ..params(1)
    };
    assert_eq!(build(&no_kernel), Err(BuildError::MissingKernel));

    let no_disk = BuildParameters {
        disk: PathBuf::new(),
        ..params(1)
    };
    assert_eq!(build(&no_disk), Err(BuildError::MissingDisk));
}

#[test]
fn core_count_is_checked_before_images() {
    assert_eq!(
        build(&BuildParameters {
            num_cpus: 0,
            ..BuildParameters::default()
        }),
        Err(BuildError::InvalidCpuCount(0))
    );
}

#[test]
fn bad_clock_names_the_field() {
    let bad = BuildParameters {
        sys_clock: "fast".to_string(),
        ..params(1)
    };
    assert_eq!(
        build(&bad),
        Err(BuildError::InvalidFrequency {
            field: "sys_clock",
            source: UnitError::MissingNumber("fast".to_string()),
        })
    );
}

#[test]
fn bad_memory_size_is_rejected() {
    let bad = BuildParameters {
        mem_size: "512XB".to_string(),
        ..params(1)
    };
    assert!(matches!(
        build(&bad),
        Err(BuildError::InvalidSize {
            field: "mem_size",
            ..
        })
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Multiplicities
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn every_core_gets_private_l1s(#[case] num_cpus: i64) {
    let system = build(&params(num_cpus)).unwrap();
    let cpus = system.cpus();
    assert_eq!(cpus.len() as i64, num_cpus);

    for (idx, cpu) in cpus.iter().enumerate() {
        assert_eq!(cpu.id, idx);
        assert_eq!(cpu.icache.kind, AccessKind::Instruction);
        assert_eq!(cpu.dcache.kind, AccessKind::Data);
        assert_eq!(cpu.tlb(AccessKind::Instruction).kind, AccessKind::Instruction);
        assert_eq!(cpu.tlb(AccessKind::Data).kind, AccessKind::Data);
    }
    assert_eq!(system.l1_caches().count() as i64, 2 * num_cpus);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(16)]
fn all_l1s_converge_on_one_l2_and_one_controller(#[case] num_cpus: i64) {
    let system = build(&params(num_cpus)).unwrap();

    for (_, l1) in system.l1_caches() {
        assert_eq!(l1.mem_side, Port::cpu_side(BusHandle::L2Bus));
    }
    assert_eq!(system.l2cache().cpu_side, Port::mem_side(BusHandle::L2Bus));
    assert_eq!(system.l2cache().mem_side, Port::cpu_side(BusHandle::MemBus));
    assert_eq!(system.mem_ctrl().port, Port::mem_side(BusHandle::MemBus));
    assert_eq!(system.mem_ranges().len(), 1);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(6)]
fn caches_upstream_of_each_bus(#[case] num_cpus: i64) {
    let system = build(&params(num_cpus)).unwrap();

    let above_l2bus: Vec<_> = system.caches_upstream_of(BusHandle::L2Bus).collect();
    assert_eq!(above_l2bus.len() as i64, 2 * num_cpus);
    assert!(above_l2bus.iter().all(|end| matches!(
        end,
        Endpoint::L1 {
            side: PortSide::MemSide,
            ..
        }
    )));
    assert_eq!(
        above_l2bus[1],
        Endpoint::L1 {
            cpu: 0,
            kind: AccessKind::Data,
            side: PortSide::MemSide,
        }
    );

    assert_eq!(
        system.caches_upstream_of(BusHandle::MemBus).collect::<Vec<_>>(),
        vec![Endpoint::L2 {
            side: PortSide::MemSide,
        }]
    );
    assert_eq!(system.caches_upstream_of(BusHandle::IoBus).count(), 0);
}

#[test]
fn bus_names_match_topology_dump() {
    for (handle, name) in [
        (BusHandle::MemBus, "membus"),
        (BusHandle::L2Bus, "l2bus"),
        (BusHandle::IoBus, "iobus"),
    ] {
        assert_eq!(handle.name(), name);
        assert_eq!(serde_json::to_value(handle).unwrap(), name);
    }
}

// ══════════════════════════════════════════════════════════
// 3. Node parameters
// ══════════════════════════════════════════════════════════

#[test]
fn default_board_parameters() {
    let system = build(&params(1)).unwrap();

    assert_eq!(system.mem_mode(), MemoryMode::Timing);
    assert!(!system.mmap_using_noreserve());
    assert_eq!(
        system.clock_domain(DomainHandle::System).clock,
        Frequency::from_hz(1_000_000_000)
    );
    assert_eq!(
        system.clock_domain(DomainHandle::Cpu).voltage_domain,
        DomainHandle::Cpu
    );
    assert_eq!(system.voltage_domain(DomainHandle::Cpu).voltage, 1.0);

    let range = system.mem_ranges()[0];
    assert_eq!(range.start, 0);
    assert_eq!(range.size, ByteSize::from_mib(512));
    assert_eq!(range.end(), 512 << 20);
    assert!(range.contains(0));
    assert!(!range.contains(512 << 20));
}

#[test]
fn clocks_and_size_follow_parameters() {
    let system = build(&BuildParameters {
        cpu_clock: "800MHz".to_string(),
        sys_clock: "500MHz".to_string(),
        mem_size: "1GB".to_string(),
        ..params(2)
    })
    .unwrap();

    assert_eq!(
        system.clock_domain(DomainHandle::Cpu).clock,
        Frequency::from_hz(800_000_000)
    );
    assert_eq!(
        system.clock_domain(DomainHandle::System).clock,
        Frequency::from_hz(500_000_000)
    );
    assert_eq!(system.mem_ctrl().range.size, ByteSize::from_mib(1024));
}

#[test]
fn cores_run_minor_model_in_cpu_domain() {
    let system = build(&params(2)).unwrap();
    for cpu in system.cpus() {
        assert_eq!(cpu.model, CpuModel::MinorCPU);
        assert_eq!(cpu.num_threads, 1);
        assert_eq!(cpu.clk_domain, DomainHandle::Cpu);
        assert_eq!(cpu.power_model, PowerModel::cpu());
        assert_eq!(cpu.icache.geometry, L1_GEOMETRY);
        assert_eq!(cpu.dcache.geometry, L1_GEOMETRY);
    }
}

#[test]
fn fixed_cache_and_bus_parameters() {
    let system = build(&params(1)).unwrap();

    assert_eq!(L1_GEOMETRY.size, ByteSize::from_kib(32));
    assert_eq!(L1_GEOMETRY.assoc, 2);
    assert_eq!(system.l2cache().geometry, L2_GEOMETRY);
    assert_eq!(L2_GEOMETRY.size, ByteSize::from_kib(512));
    assert_eq!(L2_GEOMETRY.assoc, 8);

    let membus = system.bus(BusHandle::MemBus);
    assert_eq!(membus.kind, CrossbarKind::SystemXBar);
    assert_eq!(membus.width, Some(MEMBUS_WIDTH));
    assert_eq!(system.bus(BusHandle::L2Bus).kind, CrossbarKind::L2XBar);
    assert_eq!(system.bus(BusHandle::IoBus).width, None);

    assert_eq!(system.iobridge().delay, IOBRIDGE_DELAY);
    assert_eq!(IOBRIDGE_DELAY, Latency::from_ns(50));
}

#[test]
fn memory_controller_uses_ddr3_with_dram_power() {
    let system = build(&params(1)).unwrap();
    let ctrl = system.mem_ctrl();
    assert_eq!(ctrl.interface, DramInterface::Ddr3_1600_8x8);
    assert_eq!(ctrl.power_model, PowerModel::dram());
    assert_eq!(ctrl.range, system.mem_ranges()[0]);
}

#[test]
fn workload_boots_kernel_from_cow_disk() {
    let system = build(&params(1)).unwrap();
    assert_eq!(system.platform().kind, PlatformKind::VExpressGem5V1);

    let workload = system.workload();
    assert_eq!(workload.kernel, PathBuf::from("vmlinux"));
    assert_eq!(workload.readfile, None);

    let disk = &workload.disk;
    assert_eq!(disk.slot, VirtioSlot::BLOCK0);
    assert!(!disk.image.read_only);
    assert!(disk.image.child.read_only);
    assert_eq!(disk.image.child.image_file, PathBuf::from("rootfs.img"));
}

// ══════════════════════════════════════════════════════════
// 4. Determinism and export
// ══════════════════════════════════════════════════════════

#[test]
fn same_parameters_build_same_topology() {
    let a = build(&params(4)).unwrap();
    let b = build(&params(4)).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn topology_dump_uses_simulator_notation() {
    let json = serde_json::to_value(build(&params(2)).unwrap()).unwrap();

    assert_eq!(json["cpu"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["cpu_clk_domain"]["clock"], "1GHz");
    assert_eq!(json["mem_ranges"][0]["size"], "512MB");
    assert_eq!(json["cpu"][0]["icache"]["size"], "32kB");
    assert_eq!(json["l2cache"]["size"], "512kB");
    assert_eq!(json["iobridge"]["delay"], "50ns");
    assert_eq!(json["mem_ctrl"]["interface"], "DDR3_1600_8x8");
    assert_eq!(json["realview"]["kind"], "VExpress_GEM5_V1");
}
