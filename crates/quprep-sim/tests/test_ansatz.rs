//! Tests for the layered rotation ansatz structure.

use quprep_sim::{Ansatz, Gate, GateRole, MAX_QUBITS, ParamIndex, SimError};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_single_qubit_rejected() {
    assert!(matches!(
        Ansatz::new(1, 3),
        Err(SimError::TooFewQubits { got: 1, min: 2 })
    ));
}

#[test]
fn test_oversized_register_rejected() {
    assert!(matches!(
        Ansatz::new(MAX_QUBITS + 1, 1),
        Err(SimError::TooManyQubits { .. })
    ));
}

#[test]
fn test_zero_layers_rejected() {
    assert!(matches!(Ansatz::new(3, 0), Err(SimError::NoLayers)));
}

// ---------------------------------------------------------------------------
// Gate sequence
// ---------------------------------------------------------------------------

#[test]
fn test_gate_counts_match_layout() {
    let ansatz = Ansatz::new(10, 12).unwrap();
    let counts = ansatz.gate_counts();
    assert_eq!(counts.spread, 20);
    assert_eq!(counts.rotation, 120);
    assert_eq!(counts.entangler, 120);
    assert_eq!(counts.total(), ansatz.gates().len());
    assert_eq!(ansatz.num_parameters(), 240);
    assert_eq!(ansatz.parameter_shape(), (10, 12, 2));
}

#[test]
fn test_spread_steps_bracket_the_layers() {
    let q = 4;
    let ansatz = Ansatz::new(q, 2).unwrap();
    let gates = ansatz.gates();
    for (i, gate) in gates[..q].iter().enumerate() {
        assert_eq!(*gate, Gate::Hadamard { qubit: i });
    }
    for (i, gate) in gates[gates.len() - q..].iter().enumerate() {
        assert_eq!(*gate, Gate::Hadamard { qubit: i });
    }
}

#[test]
fn test_layer_has_rotations_then_ring() {
    let q = 3;
    let ansatz = Ansatz::new(q, 2).unwrap();
    // Second layer starts after the spread and one full layer.
    let layer = &ansatz.gates()[q + 2 * q..q + 4 * q];

    for (i, gate) in layer[..q].iter().enumerate() {
        assert_eq!(
            *gate,
            Gate::Ry {
                qubit: i,
                param: ParamIndex::new(i, 1, GateRole::Rotation),
            }
        );
    }
    for (i, gate) in layer[q..].iter().enumerate() {
        assert_eq!(
            *gate,
            Gate::Crx {
                control: i,
                target: (i + 1) % q,
                param: ParamIndex::new(i, 1, GateRole::Entangler),
            }
        );
    }
}

#[test]
fn test_ring_closes_on_qubit_zero() {
    let ansatz = Ansatz::new(5, 1).unwrap();
    let last_crx = ansatz
        .gates()
        .iter()
        .filter(|g| matches!(g, Gate::Crx { .. }))
        .last()
        .copied()
        .unwrap();
    assert!(matches!(
        last_crx,
        Gate::Crx {
            control: 4,
            target: 0,
            ..
        }
    ));
}

#[test]
fn test_every_parameter_used_once() {
    let ansatz = Ansatz::new(4, 3).unwrap();
    let mut seen: Vec<_> = ansatz.gates().iter().filter_map(Gate::param).collect();
    let n = seen.len();
    seen.sort_by_key(|p| p.as_tuple());
    seen.dedup();
    assert_eq!(seen.len(), n);
    assert_eq!(n, ansatz.num_parameters());
}
