//! The three primitive actions. Each one always succeeds regardless of
//! stratagem state; an active stratagem merely notices it.

use crate::model::{Action, HistoryEntry, Identity, PrimitiveKind, State, Substrate};
use crate::stratagem;

/// Assume an identity: replaces `state.identity` wholesale.
pub fn apply_become(state: &mut State, name: &str, lens: &str, env: &str) -> Identity {
    let identity = Identity {
        name: name.to_string(),
        lens: lens.to_string(),
        env: env.to_string(),
    };
    state.identity = Some(identity.clone());
    state.add_history(HistoryEntry::new(Action::Become {
        name: identity.name.clone(),
        lens: identity.lens.clone(),
        env: identity.env.clone(),
    }));
    stratagem::record_primitive(state, PrimitiveKind::Become);
    identity
}

/// Switch substrate: replaces `state.substrate` wholesale.
pub fn apply_drugs(state: &mut State, substance: &str, method: &str, qualia: &str) -> Substrate {
    let substrate = Substrate {
        substance: substance.to_string(),
        method: method.to_string(),
        qualia: qualia.to_string(),
    };
    state.substrate = Some(substrate.clone());
    state.add_history(HistoryEntry::new(Action::Drugs {
        substance: substrate.substance.clone(),
        method: substrate.method.clone(),
        qualia: substrate.qualia.clone(),
    }));
    stratagem::record_primitive(state, PrimitiveKind::Drugs);
    substrate
}

/// Perform a ritual. Leaves identity and substrate untouched.
pub fn apply_ritual(state: &mut State, threshold: &str, steps: &[String], result: &str) {
    state.add_history(HistoryEntry::new(Action::Ritual {
        threshold: threshold.to_string(),
        steps: steps.to_vec(),
        result: result.to_string(),
    }));
    stratagem::record_primitive(state, PrimitiveKind::Ritual);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stratagem::{advance, start, Advance};

    #[test]
    fn test_become_replaces_identity() {
        let mut s = State::new();
        apply_become(&mut s, "Ada", "logic", "lab");
        apply_become(&mut s, "Basho", "haiku", "pond");

        let identity = s.identity.as_ref().unwrap();
        assert_eq!(identity.name, "Basho");
        assert_eq!(identity.lens, "haiku");
        assert_eq!(s.history.len(), 2);
        assert_eq!(s.history[1].primitive_kind(), Some(PrimitiveKind::Become));
    }

    #[test]
    fn test_drugs_replaces_substrate() {
        let mut s = State::new();
        apply_drugs(&mut s, "coffee", "espresso", "sharp");
        let substrate = s.substrate.as_ref().unwrap();
        assert_eq!(substrate.substance, "coffee");
        assert_eq!(substrate.qualia, "sharp");
        assert!(s.identity.is_none());
    }

    #[test]
    fn test_ritual_leaves_identity_and_substrate() {
        let mut s = State::new();
        apply_ritual(
            &mut s,
            "the door",
            &["breathe".to_string(), "step through".to_string()],
            "calm",
        );
        assert!(s.identity.is_none());
        assert!(s.substrate.is_none());
        match &s.history[0].action {
            Action::Ritual { steps, .. } => assert_eq!(steps.len(), 2),
            other => panic!("expected ritual, got {other:?}"),
        }
    }

    #[test]
    fn test_primitive_without_stratagem_succeeds() {
        let mut s = State::new();
        apply_become(&mut s, "Ada", "logic", "lab");
        assert!(s.stratagem.is_none());
    }

    #[test]
    fn test_primitive_satisfies_active_step() {
        let mut s = State::new();
        start(&mut s, "mirror", false).unwrap();
        apply_become(&mut s, "Ada", "logic", "lab");
        assert!(s
            .stratagem
            .as_ref()
            .unwrap()
            .steps_completed
            .contains(&PrimitiveKind::Become));
        assert!(matches!(advance(&mut s).unwrap(), Advance::Step(_)));
    }

    #[test]
    fn test_mismatched_primitive_is_recorded_but_does_not_satisfy() {
        let mut s = State::new();
        start(&mut s, "pivot", false).unwrap();
        apply_ritual(&mut s, "t", &[], "r");
        assert!(s.stratagem.as_ref().unwrap().steps_completed.is_empty());
        assert_eq!(s.history.last().unwrap().primitive_kind(), Some(PrimitiveKind::Ritual));
    }
}
