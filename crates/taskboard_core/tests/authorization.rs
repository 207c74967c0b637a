mod common;

use common::{accounts, accounts_with_ttl, card_titles, gate, service, setup, sign_up, PASSWORD};
use std::time::Duration;
use taskboard_core::{
    AccessError, BoardError, EntityRef, SessionStore, SqliteBoardRepository, SqliteSessionStore,
};
use uuid::Uuid;

fn assert_denied<T: std::fmt::Debug>(result: Result<T, BoardError>, what: &str) {
    match result {
        Err(BoardError::Forbidden(_)) | Err(BoardError::NotFound(_)) => {}
        other => panic!("{what} should be denied, got {other:?}"),
    }
}

#[test]
fn stranger_cannot_mutate_or_read_owned_entities() {
    let conn = setup();
    let (owner, _) = sign_up(&conn, "owner@example.com");
    let (stranger, _) = sign_up(&conn, "stranger@example.com");
    let service = service(&conn);

    let board = service.create_board(&owner, "Private", None).unwrap();
    let list = service.create_list(&owner, board.id, "Todo", None).unwrap();
    let card = service
        .create_card(&owner, list.id, "Secret", None, None)
        .unwrap();
    let own_board = service.create_board(&stranger, "Mine", None).unwrap();
    let own_list = service
        .create_list(&stranger, own_board.id, "Mine", None)
        .unwrap();

    assert_denied(service.get_board(&stranger, board.id), "get board");
    assert_denied(
        service.update_board(&stranger, board.id, Some("Hacked"), None),
        "update board",
    );
    assert_denied(service.delete_board(&stranger, board.id), "delete board");
    assert_denied(
        service.create_list(&stranger, board.id, "Injected", None),
        "create list",
    );
    assert_denied(service.list_lists(&stranger, board.id), "list lists");
    assert_denied(service.get_list(&stranger, list.id), "get list");
    assert_denied(service.rename_list(&stranger, list.id, "Hacked"), "rename list");
    assert_denied(
        service.move_list(&stranger, list.id, Some(own_board.id), None),
        "steal list",
    );
    assert_denied(service.delete_list(&stranger, list.id), "delete list");
    assert_denied(
        service.create_card(&stranger, list.id, "Injected", None, None),
        "create card",
    );
    assert_denied(service.list_cards(&stranger, list.id), "list cards");
    assert_denied(service.get_card(&stranger, card.id), "get card");
    assert_denied(
        service.update_card(&stranger, card.id, Some("Hacked"), None),
        "update card",
    );
    assert_denied(
        service.move_card(&stranger, card.id, Some(own_list.id), None),
        "steal card",
    );
    assert_denied(service.delete_card(&stranger, card.id), "delete card");

    assert_eq!(service.get_board(&owner, board.id).unwrap().name, "Private");
    assert_eq!(service.get_list(&owner, list.id).unwrap().name, "Todo");
    assert_eq!(
        card_titles(&service.list_cards(&owner, list.id).unwrap()),
        ["Secret"]
    );
}

#[test]
fn deleting_someone_elses_board_is_forbidden() {
    let conn = setup();
    let (u1, _) = sign_up(&conn, "u1@example.com");
    let (u2, _) = sign_up(&conn, "u2@example.com");
    let service = service(&conn);

    let b1 = service.create_board(&u1, "B1", None).unwrap();
    assert_eq!(
        service.delete_board(&u2, b1.id).unwrap_err(),
        BoardError::Forbidden(EntityRef::board(b1.id))
    );
    assert!(service.get_board(&u1, b1.id).is_ok());
}

#[test]
fn moving_card_into_foreign_list_is_forbidden() {
    let conn = setup();
    let (u1, _) = sign_up(&conn, "u1@example.com");
    let (u2, _) = sign_up(&conn, "u2@example.com");
    let service = service(&conn);

    let b1 = service.create_board(&u1, "B1", None).unwrap();
    let l1 = service.create_list(&u1, b1.id, "L1", None).unwrap();
    let c1 = service.create_card(&u1, l1.id, "C1", None, None).unwrap();
    service.create_card(&u1, l1.id, "C2", None, None).unwrap();
    let b2 = service.create_board(&u2, "B2", None).unwrap();
    let l2 = service.create_list(&u2, b2.id, "L2", None).unwrap();

    let before = service.list_cards(&u1, l1.id).unwrap();
    assert_eq!(
        service.move_card(&u1, c1.id, Some(l2.id), Some(1)).unwrap_err(),
        BoardError::Forbidden(EntityRef::list(l2.id))
    );
    assert_eq!(service.list_cards(&u1, l1.id).unwrap(), before);
    assert!(service.list_cards(&u2, l2.id).unwrap().is_empty());
}

#[test]
fn moving_list_into_foreign_board_is_forbidden() {
    let conn = setup();
    let (u1, _) = sign_up(&conn, "u1@example.com");
    let (u2, _) = sign_up(&conn, "u2@example.com");
    let service = service(&conn);

    let b1 = service.create_board(&u1, "B1", None).unwrap();
    let l1 = service.create_list(&u1, b1.id, "L1", None).unwrap();
    let b2 = service.create_board(&u2, "B2", None).unwrap();

    assert_eq!(
        service.move_list(&u1, l1.id, Some(b2.id), None).unwrap_err(),
        BoardError::Forbidden(EntityRef::board(b2.id))
    );
    assert_eq!(service.get_list(&u1, l1.id).unwrap().board_id, b1.id);
}

#[test]
fn move_into_missing_destination_is_not_found() {
    let conn = setup();
    let (u1, _) = sign_up(&conn, "u1@example.com");
    let service = service(&conn);

    let board = service.create_board(&u1, "B1", None).unwrap();
    let list = service.create_list(&u1, board.id, "L1", None).unwrap();
    let card = service.create_card(&u1, list.id, "C1", None, None).unwrap();
    let missing = Uuid::new_v4();

    assert_eq!(
        service
            .move_card(&u1, card.id, Some(missing), None)
            .unwrap_err(),
        BoardError::NotFound(EntityRef::list(missing))
    );
    assert_eq!(service.get_card(&u1, card.id).unwrap().list_id, list.id);
}

#[test]
fn missing_or_blank_credentials_are_unauthenticated() {
    let conn = setup();
    let gate = gate(&conn);

    assert!(matches!(gate.admit(None), Err(AccessError::Unauthenticated)));
    assert!(matches!(gate.admit(Some("")), Err(AccessError::Unauthenticated)));
    assert!(matches!(
        gate.admit(Some("   ")),
        Err(AccessError::Unauthenticated)
    ));
}

#[test]
fn tampered_credential_is_unauthenticated() {
    let conn = setup();
    let (_, token) = sign_up(&conn, "ada@example.com");
    let gate = gate(&conn);

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    assert!(gate.admit(Some(&token)).is_ok());
    assert!(matches!(
        gate.admit(Some(&tampered)),
        Err(AccessError::Unauthenticated)
    ));
    assert!(matches!(
        gate.admit(Some("not-a-token")),
        Err(AccessError::Unauthenticated)
    ));
}

#[test]
fn expired_credential_is_unauthenticated() {
    let conn = setup();
    let accounts = accounts_with_ttl(&conn, Duration::ZERO);
    accounts
        .register("Ada", "ada@example.com", PASSWORD)
        .unwrap();
    let session = accounts.login("ada@example.com", PASSWORD).unwrap();

    assert!(matches!(
        gate(&conn).admit(Some(session.token.as_str())),
        Err(AccessError::Unauthenticated)
    ));
    assert_eq!(accounts.purge_expired_sessions().unwrap(), 1);
}

#[test]
fn credential_of_deleted_user_is_unauthenticated() {
    let conn = setup();
    let (caller, token) = sign_up(&conn, "ada@example.com");

    conn.execute(
        "DELETE FROM users WHERE uuid = ?1;",
        [caller.user_id().to_string()],
    )
    .unwrap();

    assert!(matches!(
        gate(&conn).admit(Some(&token)),
        Err(AccessError::Unauthenticated)
    ));
}

#[test]
fn logged_out_credential_is_unauthenticated() {
    let conn = setup();
    let (_, token) = sign_up(&conn, "ada@example.com");

    accounts(&conn).logout(&token).unwrap();
    accounts(&conn).logout(&token).unwrap();
    assert!(matches!(
        gate(&conn).admit(Some(&token)),
        Err(AccessError::Unauthenticated)
    ));
}

#[test]
fn unauthenticated_request_does_not_reveal_target_existence() {
    let conn = setup();
    let (owner, token) = sign_up(&conn, "ada@example.com");
    let service = service(&conn);
    let board = service.create_board(&owner, "B1", None).unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let gate = gate(&conn);

    let existing = gate.admit_owner(Some("bogus"), &repo, EntityRef::board(board.id));
    let missing = gate.admit_owner(Some("bogus"), &repo, EntityRef::board(Uuid::new_v4()));
    assert!(matches!(existing, Err(AccessError::Unauthenticated)));
    assert!(matches!(missing, Err(AccessError::Unauthenticated)));

    let admitted = gate
        .admit_owner(Some(&token), &repo, EntityRef::board(board.id))
        .unwrap();
    assert_eq!(admitted, owner);
    assert!(matches!(
        gate.admit_owner(Some(&token), &repo, EntityRef::card(Uuid::new_v4())),
        Err(AccessError::NotFound(_))
    ));
}

#[test]
fn one_resolution_serves_several_checks() {
    let conn = setup();
    let (_, token) = sign_up(&conn, "ada@example.com");
    let store = SqliteSessionStore::try_new(&conn, Duration::from_secs(60)).unwrap();
    let caller = gate(&conn).admit(Some(&token)).unwrap();

    store.invalidate(&token).unwrap();

    let service = service(&conn);
    let board = service.create_board(&caller, "Still works", None).unwrap();
    let list = service.create_list(&caller, board.id, "L", None).unwrap();
    assert_eq!(list.board_id, board.id);
    assert!(gate(&conn).admit(Some(&token)).is_err());
}
