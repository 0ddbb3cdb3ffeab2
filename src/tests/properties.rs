// Properties - Randomized checks of ledger totality and turnstile invariants

#[cfg(test)]
mod ledger_properties {
    use crate::activation::{ActivationLedger, DeploymentPhase, EnforcementRule};
    use crate::types::AddressClass;
    use proptest::prelude::*;

    fn proptest_config() -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: 64,
            ..Default::default()
        }
    }

    /// Contiguous legacy schedule from strictly increasing boundaries
    fn schedule(boundaries: &[u64], rules: &[bool]) -> Vec<DeploymentPhase> {
        let rule = |i: usize| {
            if rules.get(i).copied().unwrap_or(false) {
                EnforcementRule::TurnstileRequired
            } else {
                EnforcementRule::Voluntary
            }
        };

        let mut starts = vec![0u64];
        starts.extend(boundaries.iter().copied());
        let mut table: Vec<DeploymentPhase> = starts
            .windows(2)
            .enumerate()
            .map(|(i, w)| DeploymentPhase::new(AddressClass::LegacyEcc, w[0], Some(w[1]), rule(i)))
            .collect();
        let last = starts.len() - 1;
        table.push(DeploymentPhase::open(AddressClass::LegacyEcc, starts[last], rule(last)));
        table.push(DeploymentPhase::open(AddressClass::QuantumResistant, 0, EnforcementRule::Voluntary));
        table.push(DeploymentPhase::open(AddressClass::Hybrid, 0, EnforcementRule::Voluntary));
        table
    }

    fn boundaries() -> impl Strategy<Value = Vec<u64>> {
        proptest::collection::btree_set(1u64..1_000_000, 0..6)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn every_height_maps_to_exactly_one_phase(
            bounds in boundaries(),
            rules in proptest::collection::vec(any::<bool>(), 7),
            height in 0u64..2_000_000,
        ) {
            let table = schedule(&bounds, &rules);
            let ledger = ActivationLedger::new(&table).unwrap();

            for class in AddressClass::SPENDABLE {
                let containing = ledger
                    .phases_for(class)
                    .iter()
                    .filter(|phase| phase.contains(height))
                    .count();
                prop_assert_eq!(containing, 1);

                let active = ledger.active_phase(class, height).unwrap();
                prop_assert!(active.contains(height));
            }
            prop_assert!(ledger.active_phase(AddressClass::Unknown, height).is_none());
        }

        #[test]
        fn lookup_is_constant_within_a_phase(
            bounds in boundaries(),
            rules in proptest::collection::vec(any::<bool>(), 7),
            a in 0u64..2_000_000,
            b in 0u64..2_000_000,
        ) {
            let (h1, h2) = if a <= b { (a, b) } else { (b, a) };
            let ledger = ActivationLedger::new(&schedule(&bounds, &rules)).unwrap();

            let p1 = *ledger.active_phase(AddressClass::LegacyEcc, h1).unwrap();
            if p1.contains(h2) {
                prop_assert_eq!(Some(&p1), ledger.active_phase(AddressClass::LegacyEcc, h2));
            }
        }

        #[test]
        fn phase_start_is_inclusive(bounds in boundaries()) {
            let rules = vec![false, true, false, true, false, true, false];
            let ledger = ActivationLedger::new(&schedule(&bounds, &rules)).unwrap();

            for start in bounds {
                let phase = ledger.active_phase(AddressClass::LegacyEcc, start).unwrap();
                prop_assert_eq!(phase.start_height, start);
            }
        }

        #[test]
        fn removing_a_phase_is_a_configuration_error(
            bounds in proptest::collection::btree_set(1u64..1_000_000, 2..6),
            drop_index in 0usize..5,
        ) {
            let bounds: Vec<u64> = bounds.into_iter().collect();
            let mut table = schedule(&bounds, &[]);
            // Drop an interior legacy phase (legacy phases come first in the table)
            let legacy_phases = bounds.len() + 1;
            let index = 1 + drop_index % (legacy_phases - 2);
            table.remove(index);
            prop_assert!(ActivationLedger::new(&table).is_err());
        }
    }
}

#[cfg(test)]
mod turnstile_properties {
    use crate::consensus::RejectReason;
    use crate::script::ScriptEvaluator;
    use crate::storage::MemoryUtxoStore;
    use crate::tests::helpers::*;
    use crate::types::{AddressClass, ChainContext, Output, SchemeId, COIN};
    use proptest::prelude::*;

    fn proptest_config() -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: 48,
            ..Default::default()
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn accepted_turnstile_satisfies_floor(
            legacy_in in 1u64..(100 * COIN),
            qr_share in 0u64..=100,
            change_share in 0u64..=100,
        ) {
            let alice = LegacyKey::new(1);
            let alice_qr = QrKey::new(7);
            let funding = outpoint("funding");
            let store = MemoryUtxoStore::with_outputs([(funding, alice.output(legacy_in))]);

            let qr_out = legacy_in / 100 * qr_share;
            let change = (legacy_in - qr_out) / 100 * change_share;
            let fee = legacy_in - qr_out - change;

            let mut outputs = vec![alice_qr.txout(qr_out)];
            if change > 0 {
                outputs.push(alice.txout(change));
            }
            let mut tx = unsigned(&[funding], outputs);
            alice.sign_input(&mut tx, 0);
            alice_qr.authorize(&mut tx, 0);

            let ctx = ChainContext::new(TURNSTILE_HEIGHT, 0);
            let result = validator().validate(&tx, &ctx, &store);

            if qr_out + fee >= legacy_in {
                prop_assert!(result.accepted, "{:?}", result);
                let record = result.turnstile.unwrap();
                prop_assert!(record.qr_out + record.fee >= record.legacy_in);
                prop_assert_eq!(record.fee, fee);
            } else {
                prop_assert_eq!(result.reason, Some(RejectReason::InsufficientQROutput));
            }
        }

        #[test]
        fn validation_is_idempotent(
            value in 1u64..(10 * COIN),
            spend in 0u64..(10 * COIN),
            height in (TURNSTILE_HEIGHT - 3)..(TURNSTILE_HEIGHT + 3),
        ) {
            let alice = LegacyKey::new(1);
            let alice_qr = QrKey::new(7);
            let funding = outpoint("funding");
            let store = MemoryUtxoStore::with_outputs([(funding, alice.output(value))]);

            let mut tx = unsigned(&[funding], vec![alice_qr.txout(spend)]);
            alice.sign_input(&mut tx, 0);
            alice_qr.authorize(&mut tx, 0);

            let validator = validator();
            let ctx = ChainContext::new(height, 0);
            prop_assert_eq!(
                validator.validate(&tx, &ctx, &store),
                validator.validate(&tx, &ctx, &store)
            );
        }

        #[test]
        fn arbitrary_scripts_never_panic(
            locking in proptest::collection::vec(any::<u8>(), 0..128),
            unlocking in proptest::collection::vec(any::<u8>(), 0..128),
        ) {
            let class = crate::script::classify(&locking);
            let funding = outpoint("funding");
            let store = MemoryUtxoStore::with_outputs([(funding, Output::new(COIN, locking.clone()))]);

            let mut tx = unsigned(&[funding], vec![QrKey::new(3).txout(COIN / 2)]);
            tx.inputs[0].unlocking_script = unlocking.clone();
            let result = validator().validate(&tx, &ChainContext::new(10, 0), &store);
            if class == AddressClass::Unknown {
                prop_assert_eq!(result.reason, Some(RejectReason::UnknownOutputClass));
            }

            let registry = registry();
            let limits = crate::script::ScriptLimits::default();
            let evaluator = ScriptEvaluator::new(&registry, &limits, SchemeId::ED25519);
            let _ = evaluator.verify_input(&unlocking, &locking, b"msg");
        }
    }
}
