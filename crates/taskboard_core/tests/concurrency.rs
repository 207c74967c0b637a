mod common;

use common::{card_titles, positions, service, service_with_scopes, sign_up};
use std::sync::{Arc, Barrier};
use std::thread;
use taskboard_core::db::open_db;
use taskboard_core::ExclusiveScopes;

#[test]
fn concurrent_reorders_on_one_list_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boards.sqlite3");
    let conn = open_db(&path).unwrap();
    let (caller, _) = sign_up(&conn, "ada@example.com");

    let setup = service(&conn);
    let board = setup.create_board(&caller, "Board", None).unwrap();
    let list = setup.create_list(&caller, board.id, "Todo", None).unwrap();
    let ids: Vec<_> = ["A", "B", "C", "D"]
        .iter()
        .map(|title| {
            setup
                .create_card(&caller, list.id, title, None, None)
                .unwrap()
                .id
        })
        .collect();

    let scopes = Arc::new(ExclusiveScopes::new());
    let barrier = Arc::new(Barrier::new(2));
    let moves = [(ids[0], 4), (ids[3], 1)];

    let workers: Vec<_> = moves
        .into_iter()
        .map(|(card_id, rank)| {
            let worker_conn = open_db(&path).unwrap();
            let scopes = Arc::clone(&scopes);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let service = service_with_scopes(&worker_conn, scopes);
                barrier.wait();
                service
                    .move_card(&caller, card_id, None, Some(rank))
                    .map(|card| card.id)
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap().unwrap();
    }

    let cards = setup.list_cards(&caller, list.id).unwrap();
    assert_eq!(card_titles(&cards), ["D", "B", "C", "A"]);
    assert_eq!(positions(&cards), [1, 2, 3, 4]);
}

#[test]
fn concurrent_creates_never_duplicate_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boards.sqlite3");
    let conn = open_db(&path).unwrap();
    let (caller, _) = sign_up(&conn, "ada@example.com");

    let setup = service(&conn);
    let board = setup.create_board(&caller, "Board", None).unwrap();
    let list = setup.create_list(&caller, board.id, "Todo", None).unwrap();

    let scopes = Arc::new(ExclusiveScopes::new());
    let barrier = Arc::new(Barrier::new(3));
    let workers: Vec<_> = (0..3)
        .map(|worker| {
            let worker_conn = open_db(&path).unwrap();
            let scopes = Arc::clone(&scopes);
            let barrier = Arc::clone(&barrier);
            let list_id = list.id;
            thread::spawn(move || {
                let service = service_with_scopes(&worker_conn, scopes);
                barrier.wait();
                for index in 0..8 {
                    let rank = if index % 2 == 0 { None } else { Some(1) };
                    service
                        .create_card(&caller, list_id, &format!("w{worker}-{index}"), None, rank)
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let cards = setup.list_cards(&caller, list.id).unwrap();
    assert_eq!(cards.len(), 24);
    let expected: Vec<i64> = (1..=24).collect();
    assert_eq!(positions(&cards), expected);
}

#[test]
fn writers_on_different_lists_both_commit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boards.sqlite3");
    let conn = open_db(&path).unwrap();
    let (caller, _) = sign_up(&conn, "ada@example.com");

    let setup = service(&conn);
    let board = setup.create_board(&caller, "Board", None).unwrap();
    let lists: Vec<_> = ["Left", "Right"]
        .iter()
        .map(|name| setup.create_list(&caller, board.id, name, None).unwrap().id)
        .collect();

    let scopes = Arc::new(ExclusiveScopes::new());
    let workers: Vec<_> = lists
        .iter()
        .map(|list_id| {
            let worker_conn = open_db(&path).unwrap();
            let scopes = Arc::clone(&scopes);
            let list_id = *list_id;
            thread::spawn(move || {
                let service = service_with_scopes(&worker_conn, scopes);
                for index in 0..5 {
                    service
                        .create_card(&caller, list_id, &format!("card-{index}"), None, Some(1))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    for list_id in lists {
        let cards = setup.list_cards(&caller, list_id).unwrap();
        assert_eq!(
            card_titles(&cards),
            ["card-4", "card-3", "card-2", "card-1", "card-0"]
        );
    }
}
