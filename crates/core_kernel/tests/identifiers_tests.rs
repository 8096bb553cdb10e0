//! Tests for strongly-typed identifiers and id generators

use core_kernel::{
    AccountId, CommandId, IdGenerator, InvoiceId, LedgerId, RandomIds, SequentialIds,
    TransactionId,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

mod display_and_parsing {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(LedgerId::prefix(), "LGR");
        assert_eq!(AccountId::prefix(), "ACC");
        assert_eq!(TransactionId::prefix(), "TXN");
        assert_eq!(CommandId::prefix(), "CMD");
        assert_eq!(InvoiceId::prefix(), "INV");
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let uuid = Uuid::new_v4();
        let with_prefix: InvoiceId = format!("INV-{}", uuid).parse().unwrap();
        let without_prefix: InvoiceId = uuid.to_string().parse().unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert_eq!(with_prefix.as_uuid(), &uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("TXN-not-a-uuid".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = CommandId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: CommandId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

mod generators {
    use super::*;

    #[test]
    fn test_sequential_ids_are_deterministic() {
        let a: Arc<dyn IdGenerator> = Arc::new(SequentialIds::new());
        let b: Arc<dyn IdGenerator> = Arc::new(SequentialIds::new());

        let first_a: AccountId = a.next_id();
        let first_b: AccountId = b.next_id();
        assert_eq!(first_a, first_b);
        assert_eq!(*first_a.as_uuid(), Uuid::from_u128(1));
    }

    #[test]
    fn test_random_ids_do_not_repeat() {
        let ids: Arc<dyn IdGenerator> = Arc::new(RandomIds);
        let seen: HashSet<TransactionId> = (0..500).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 500);
    }

    #[test]
    fn test_sequential_ids_across_threads() {
        let ids: Arc<dyn IdGenerator> = Arc::new(SequentialIds::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..100).map(|_| ids.next_uuid()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
        assert_eq!(all.len(), 400);
    }
}
