// tests/shaper/tick_drain_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use leaky_shaper::{
        Admission, DropReason, Packet, PolicyKind, Shaper, ShaperConfig, StatsSnapshot,
    };

    #[test]
    fn bucket_only_ticks_send_nothing_but_leak() {
        let mut shaper = Shaper::with_config(ShaperConfig::new(20, 3), TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 12), 0).unwrap();
        let sent = shaper.tick_at(2).unwrap();
        assert!(sent.is_empty());
        assert_eq!(shaper.status().level, 6);
        assert_eq!(shaper.stats().ticks, 1);
        assert!(shaper.queue().is_none());
    }

    #[test]
    fn queue_full_drops_without_taking_bucket_space() {
        let config = ShaperConfig::new(100, 0).queue(2);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        assert!(shaper.submit_at(Packet::new(1, 1), 0).unwrap().is_accepted());
        assert!(shaper.submit_at(Packet::new(2, 1), 0).unwrap().is_accepted());
        assert_eq!(
            shaper.submit_at(Packet::new(3, 1), 0).unwrap(),
            Admission::Dropped(DropReason::QueueFull)
        );

        let status = shaper.status();
        assert_eq!(status.level, 2);
        assert_eq!(status.queue_len, 2);
        assert_eq!(status.stats.dropped_queue_full, 1);
        assert_eq!(status.stats.dropped_overflow, 0);
    }

    #[test]
    fn bucket_overflow_keeps_packet_out_of_queue() {
        let config = ShaperConfig::new(10, 0).queue(8);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 8), 0).unwrap();
        assert_eq!(
            shaper.submit_at(Packet::new(2, 3), 0).unwrap(),
            Admission::Dropped(DropReason::BucketOverflow)
        );
        assert_eq!(shaper.queue_len(), 1);
    }

    #[test]
    fn leftover_budget_is_not_carried_over() {
        // budget 10; queue 6, 6: one per tick even though 4 is left each time
        let config = ShaperConfig::new(10, 10).queue(4);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 6), 0).unwrap();
        shaper.submit_at(Packet::new(2, 6), 1).unwrap();

        assert_eq!(shaper.tick_at(2).unwrap().len(), 1);
        assert_eq!(shaper.tick_at(3).unwrap().len(), 1);
        assert!(shaper.tick_at(4).unwrap().is_empty());
    }

    #[test]
    fn drained_packets_keep_fifo_order_and_identity() {
        let config = ShaperConfig::new(10, 10).queue(8);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        for (t, id) in [(0, 7), (1, 3), (2, 9)] {
            shaper.submit_at(Packet::new(id, 3).stamped(t), t).unwrap();
        }
        let sent = shaper.tick_at(3).unwrap();
        assert_eq!(sent.iter().map(Packet::id).collect::<Vec<_>>(), vec![7, 3, 9]);
        assert_eq!(
            sent.iter().map(Packet::enqueued_at).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn reset_clears_queue_level_and_stats() {
        let config = ShaperConfig::new(10, 1).queue(4);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 4), 0).unwrap();
        shaper.submit_at(Packet::new(2, 4), 0).unwrap();
        shaper.tick_at(1).unwrap();
        shaper.submit_at(Packet::new(3, 4), 2).unwrap();

        shaper.reset();
        let status = shaper.status();
        assert_eq!(status.level, 0);
        assert_eq!(status.queue_len, 0);
        assert_eq!(status.current_rate, 1);
        assert_eq!(status.capacity, 10);
        assert_eq!(status.queue_capacity, Some(4));
        assert_eq!(status.stats, StatsSnapshot::default());
    }

    #[test]
    fn reset_keeps_the_current_rate() {
        let config = ShaperConfig::new(30, 3).policy(PolicyKind::Adaptive);
        let mut shaper = Shaper::with_config(config, TestClock::new(0)).unwrap();
        shaper.submit_at(Packet::new(1, 25), 0).unwrap();
        assert_eq!(shaper.status().current_rate, 2);

        shaper.reset();
        assert_eq!(shaper.status().current_rate, 2);
        assert_eq!(shaper.status().base_rate, 3);

        // empty bucket still selects 0.7x, which is no change
        shaper.submit_at(Packet::new(2, 1), 0).unwrap();
        assert_eq!(shaper.status().current_rate, 2);
        assert_eq!(shaper.stats().rate_changes, 0);
    }
}
