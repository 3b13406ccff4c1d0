
    use super::*;
    use chrono::Duration;

    fn local_node(name: &str) -> Arc<Node> {
        let config = NodeConfig::default().with_name(name).with_host("127.0.0.1");
        Arc::new(Node::with_config(config).unwrap())
    }

    #[test]
    fn test_config_overrides_apply() {
        let config = NodeConfig::default()
            .with_name("edge-1")
            .with_host("10.0.0.7")
            .with_port(7000);
        let node = Node::with_config(config).unwrap();

        let identity = node.identity();
        assert_eq!(identity.name, "edge-1");
        assert_eq!(identity.host, "10.0.0.7");
        assert_eq!(identity.port, 7000);
        assert_eq!(identity.id, node.id());
    }

    #[test]
    fn test_defaults_fill_unset_fields() {
        let config = NodeConfig {
            host: Some("127.0.0.1".to_string()),
            ..Default::default()
        };
        let node = Node::with_config(config).unwrap();
        assert!(!node.name().is_empty());
        assert_eq!(node.port(), crate::config::DEFAULT_NODE_PORT);
    }

    #[test]
    fn test_host_discovered_when_unset() {
        let mut config = NodeConfig::default().with_name("probe");
        config.discovery.probe_addr = "127.0.0.1:9".to_string();
        let node = Node::with_config(config).unwrap();
        assert_eq!(node.host(), "127.0.0.1");
    }

    #[test]
    fn test_invalid_token_config_rejected_at_construction() {
        let mut config = NodeConfig::default().with_name("n").with_host("127.0.0.1");
        config.join_token.ttl_secs = 0;
        assert!(matches!(
            Node::with_config(config),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_blank_host_rejected_at_construction() {
        for host in ["", "   "] {
            let config = NodeConfig::default().with_name("n").with_host(host);
            let err = Node::with_config(config).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig { ref field, .. } if field == "node.host"));
        }
    }

    #[tokio::test]
    async fn test_issue_with_huge_ttl_fails_without_recording() {
        let node = local_node("issuer");
        let config = JoinTokenConfig::default().with_ttl_secs(9_000_000_000_000);

        let err = node.issue_join_token_with(config).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert_eq!(node.issued_token_count().await, 0);
    }

    #[tokio::test]
    async fn test_identity_is_stable() {
        let node = local_node("stable");
        let before = node.identity();

        node.add_neighbor(local_node("peer")).await.unwrap();
        node.issue_join_token().await.unwrap();

        assert_eq!(node.identity(), before);
    }

    #[tokio::test]
    async fn test_add_neighbor_twice_fails() {
        let n1 = local_node("n1");
        let n2 = local_node("n2");

        n1.add_neighbor(n2.clone()).await.unwrap();
        let err = n1.add_neighbor(n2.clone()).await.unwrap_err();

        match err {
            Error::AlreadyNeighbor { id, name } => {
                assert_eq!(id, n2.id());
                assert_eq!(name, "n2");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(n1.neighbor_count().await, 1);
    }

    #[tokio::test]
    async fn test_neighbor_relation_is_one_directional() {
        let a = local_node("a");
        let b = local_node("b");
        assert_ne!(a.id(), b.id());

        a.add_neighbor(b.clone()).await.unwrap();

        assert_eq!(a.neighbor_count().await, 1);
        assert_eq!(b.neighbor_count().await, 0);
        assert!(a.is_neighbor(b.id()).await);
        assert!(!b.is_neighbor(a.id()).await);
    }

    #[tokio::test]
    async fn test_self_neighbor_rejected() {
        let node = local_node("solo");
        let err = node.add_neighbor(node.clone()).await.unwrap_err();
        assert!(matches!(err, Error::SelfNeighbor(id) if id == node.id()));
        assert_eq!(node.neighbor_count().await, 0);
    }

    #[tokio::test]
    async fn test_mutual_neighbors_do_not_deadlock() {
        let a = local_node("a");
        let b = local_node("b");

        let (ra, rb) = tokio::join!(a.add_neighbor(b.clone()), b.add_neighbor(a.clone()));
        ra.unwrap();
        rb.unwrap();

        assert!(a.is_neighbor(b.id()).await);
        assert!(b.is_neighbor(a.id()).await);
    }

    #[tokio::test]
    async fn test_neighbors_snapshot() {
        let node = local_node("hub");
        let peer = local_node("spoke");
        node.add_neighbor(peer.clone()).await.unwrap();

        let neighbors = node.neighbors().await;
        assert_eq!(neighbors, vec![peer.identity()]);
        assert!(node.neighbor(peer.id()).await.is_some());
        assert!(node.neighbor(NodeId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_issue_join_token_records_token() {
        let node = local_node("issuer");
        let token = node.issue_join_token().await.unwrap();

        assert_eq!(token.host(), node.host());
        assert_eq!(token.value().len(), 64);
        assert_eq!(token.ttl(), Duration::seconds(300));
        assert_eq!(node.issued_token_count().await, 1);
        assert_eq!(node.token_state(token.id()).await, Some(JoinTokenState::Valid));
    }

    #[tokio::test]
    async fn test_issue_with_host_override() {
        let node = local_node("issuer");
        let config = JoinTokenConfig::default().with_host("192.0.2.10");
        let token = node.issue_join_token_with(config).await.unwrap();
        assert_eq!(token.host(), "192.0.2.10");
    }

    #[tokio::test]
    async fn test_issue_without_host_uses_node_discovery() {
        let mut config = NodeConfig::default().with_name("issuer").with_host("10.0.0.7");
        config.discovery.probe_addr = "127.0.0.1:9".to_string();
        let node = Node::with_config(config).unwrap();

        let token = node
            .issue_join_token_with(JoinTokenConfig::default())
            .await
            .unwrap();
        assert_eq!(token.host(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_redeem_once() {
        let node = local_node("issuer");
        let token = node.issue_join_token().await.unwrap();

        let redeemed = node.redeem_join_token(token.value()).await.unwrap();
        assert_eq!(redeemed.id(), token.id());
        assert_eq!(node.token_state(token.id()).await, Some(JoinTokenState::Redeemed));

        let err = node.redeem_join_token(token.value()).await.unwrap_err();
        assert!(matches!(err, Error::TokenAlreadyRedeemed));
    }

    #[tokio::test]
    async fn test_redeem_unknown_value() {
        let node = local_node("issuer");
        node.issue_join_token().await.unwrap();

        let err = node.redeem_join_token("not-a-token").await.unwrap_err();
        assert!(matches!(err, Error::TokenNotFound));
    }

    #[tokio::test]
    async fn test_redeem_expired_token_fails_without_change() {
        let node = local_node("issuer");
        let token = node.issue_join_token().await.unwrap();
        let later = token.expires_at() + Duration::seconds(1);

        let err = node
            .redeem_join_token_at(token.value(), later)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenExpired));
        assert_eq!(node.issued_token_count().await, 1);
    }

    #[tokio::test]
    async fn test_redeem_at_expiry_instant_fails() {
        let node = local_node("issuer");
        let token = node.issue_join_token().await.unwrap();

        let err = node
            .redeem_join_token_at(token.value(), token.expires_at())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenExpired));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redeem_single_winner() {
        let node = local_node("issuer");
        let token = node.issue_join_token().await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let node = node.clone();
            let value = token.value().to_string();
            handles.push(tokio::spawn(async move {
                node.redeem_join_token(&value).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, Error::TokenAlreadyRedeemed)),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_admit_redeems_and_adds_neighbor() {
        let issuer = local_node("issuer");
        let joiner = local_node("joiner");
        let token = issuer.issue_join_token().await.unwrap();

        let used = issuer.admit(token.value(), joiner.clone()).await.unwrap();

        assert_eq!(used.id(), token.id());
        assert!(issuer.is_neighbor(joiner.id()).await);
        assert_eq!(joiner.neighbor_count().await, 0);
        assert_eq!(issuer.token_state(token.id()).await, Some(JoinTokenState::Redeemed));
    }

    #[tokio::test]
    async fn test_admit_duplicate_keeps_token() {
        let issuer = local_node("issuer");
        let joiner = local_node("joiner");
        issuer.add_neighbor(joiner.clone()).await.unwrap();
        let token = issuer.issue_join_token().await.unwrap();

        let err = issuer.admit(token.value(), joiner.clone()).await.unwrap_err();

        assert!(matches!(err, Error::AlreadyNeighbor { .. }));
        assert_eq!(issuer.token_state(token.id()).await, Some(JoinTokenState::Valid));
    }

    #[tokio::test]
    async fn test_admit_with_bad_token_adds_nothing() {
        let issuer = local_node("issuer");
        let joiner = local_node("joiner");
        let token = issuer.issue_join_token().await.unwrap();
        let later = token.expires_at();

        let err = issuer
            .admit_at(token.value(), joiner.clone(), later)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TokenExpired));
        assert_eq!(issuer.neighbor_count().await, 0);
    }

    #[tokio::test]
    async fn test_prune_removes_expired_and_redeemed() {
        let node = local_node("issuer");
        let spent = node.issue_join_token().await.unwrap();
        let fresh = node.issue_join_token().await.unwrap();
        node.redeem_join_token(spent.value()).await.unwrap();

        assert_eq!(node.prune_tokens().await, 1);
        assert_eq!(node.token_state(spent.id()).await, None);
        assert_eq!(node.token_state(fresh.id()).await, Some(JoinTokenState::Valid));

        let later = fresh.expires_at() + Duration::seconds(1);
        assert_eq!(node.prune_tokens_at(later).await, 1);
        assert_eq!(node.issued_token_count().await, 0);
    }

    #[test]
    fn test_debug_omits_membership() {
        let node = local_node("dbg");
        let debug = format!("{:?}", node);
        assert!(debug.contains("dbg"));
        assert!(!debug.contains("neighbors"));
    }

    #[test]
    fn test_issue_from_sync_context() {
        let node = local_node("sync");
        let token = tokio_test::block_on(node.issue_join_token()).unwrap();
        assert_eq!(tokio_test::block_on(node.issued_token_count()), 1);
        assert!(!token.is_expired());
    }
