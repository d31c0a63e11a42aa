// tests/shaper/scenario_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use leaky_shaper::{
        Admission, DropReason, Packet, PolicyKind, Priority, Shaper, ShaperConfig,
    };

    #[test]
    fn fixed_rate_arrivals_one_tick_apart() {
        // capacity 20, leak 3 per tick, one arrival per tick
        let clock = TestClock::new(0);
        let mut shaper = Shaper::with_config(ShaperConfig::new(20, 3), clock.clone()).unwrap();

        let mut decisions = Vec::new();
        let mut levels = Vec::new();
        for (i, size) in [5, 3, 8, 12, 7].into_iter().enumerate() {
            decisions.push(shaper.submit(Packet::new(i as u64, size)).unwrap());
            levels.push(shaper.status().level);
            clock.advance(1);
        }

        // 5 | 5-3+3=5 | 5-3+8=10 | 10-3+12=19 | 19-3=16, 16+7>20
        assert_eq!(
            decisions,
            vec![
                Admission::Accepted,
                Admission::Accepted,
                Admission::Accepted,
                Admission::Accepted,
                Admission::Dropped(DropReason::BucketOverflow),
            ]
        );
        assert_eq!(levels, vec![5, 5, 10, 19, 16]);

        let stats = shaper.stats();
        assert_eq!((stats.received, stats.accepted, stats.dropped), (5, 4, 1));
        assert_eq!(stats.rate_changes, 0);
        assert_eq!(stats.accept_ratio, 0.8);
    }

    #[test]
    fn faster_arrivals_overflow_sooner() {
        // same sizes, all at once: no leak between arrivals
        let mut shaper =
            Shaper::with_config(ShaperConfig::new(20, 3), TestClock::new(0)).unwrap();
        let decisions: Vec<bool> = [5, 3, 8, 12, 7]
            .into_iter()
            .enumerate()
            .map(|(i, size)| shaper.submit_at(Packet::new(i as u64, size), 0).unwrap().is_accepted())
            .collect();
        assert_eq!(decisions, vec![true, true, true, false, false]);
        assert_eq!(shaper.status().level, 16);
    }

    #[test]
    fn adaptive_rate_triples_above_eighty_percent() {
        let config = ShaperConfig::new(30, 3).policy(PolicyKind::Adaptive);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();

        // empty bucket: below 20% fill, rate drops to 0.7x
        assert!(shaper.submit_at(Packet::new(1, 25), 0).unwrap().is_accepted());
        assert_eq!(shaper.status().current_rate, 2);

        // 25/30 is above 80%, the next submit sees it
        assert!(shaper.submit_at(Packet::new(2, 1), 0).unwrap().is_accepted());
        let status = shaper.status();
        assert_eq!(status.current_rate, 9);
        assert_eq!(status.stats.rate_changes, 2);
    }

    #[test]
    fn adaptive_rate_drains_faster_when_full() {
        let config = ShaperConfig::new(30, 3).policy(PolicyKind::Adaptive);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 26), 0).unwrap();

        // rate is recomputed at 26/30 fill before the leak, so 9 per tick
        shaper.submit_at(Packet::new(2, 1), 1).unwrap();
        assert_eq!(shaper.status().current_rate, 9);
        assert_eq!(shaper.status().level, 26 - 9 + 1);
    }

    #[test]
    fn priority_classes_select_distinct_rates() {
        let config = ShaperConfig::new(100, 4).policy(PolicyKind::Priority);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();

        shaper
            .submit_at(Packet::new(1, 5).with_priority(Priority::High), 0)
            .unwrap();
        let high = shaper.status().current_rate;

        shaper
            .submit_at(Packet::new(2, 5).with_priority(Priority::Low), 0)
            .unwrap();
        let low = shaper.status().current_rate;

        assert_eq!(high, 12);
        assert_eq!(low, 2);
        assert_eq!(shaper.stats().rate_changes, 2);
    }

    #[test]
    fn tick_drain_groups_packets_by_budget() {
        // leak of 10 per tick empties the bucket between arrivals
        let config = ShaperConfig::new(10, 10).queue(20);
        let clock = TestClock::new(0);
        let mut shaper = Shaper::with_config(config, clock.clone()).unwrap();

        for (i, size) in [3, 2, 5, 4, 1, 6, 3, 7].into_iter().enumerate() {
            let admission = shaper.submit(Packet::new(101 + i as u64, size)).unwrap();
            assert_eq!(admission, Admission::Accepted);
            clock.advance(1);
        }
        assert_eq!(shaper.queue_len(), 8);

        let mut groups = Vec::new();
        while shaper.queue_len() > 0 {
            let sent = shaper.tick().unwrap();
            groups.push(sent.iter().map(Packet::size).collect::<Vec<_>>());
            clock.advance(1);
        }
        assert_eq!(
            groups,
            vec![vec![3, 2, 5], vec![4, 1], vec![6, 3], vec![7]]
        );

        let stats = shaper.stats();
        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.sent, 8);
        assert_eq!(stats.sent_units, 31);
    }

    #[test]
    fn status_is_idempotent() {
        let config = ShaperConfig::new(20, 3).queue(4).policy(PolicyKind::Adaptive);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 7), 0).unwrap();
        shaper.submit_at(Packet::new(2, 9), 3).unwrap();

        let first = shaper.status();
        let second = shaper.status();
        let third = shaper.status();
        assert_eq!(first, second);
        assert_eq!(second, third);
    }
}
