use inventory_core::db::open_db_in_memory;
use inventory_core::{
    ConflictPolicy, Item, ItemRepository, ItemValidationError, RepoError, SqliteItemRepository,
};

#[test]
fn list_is_ordered_by_id_regardless_of_insert_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    repo.insert_item(&Item::new(3, "Cherries", 3.0, 3)).unwrap();
    repo.insert_item(&Item::new(1, "Apples", 1.0, 1)).unwrap();
    repo.insert_item(&Item::new(2, "Bananas", 2.0, 2)).unwrap();

    let ids: Vec<_> = repo.list_items().unwrap().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn update_and_delete_report_whether_a_row_changed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);
    repo.insert_item(&Item::new(1, "Apples", 10.0, 20)).unwrap();

    assert!(repo.update_item(&Item::new(1, "Apples", 9.0, 19)).unwrap());
    assert!(!repo.update_item(&Item::new(5, "Missing", 1.0, 1)).unwrap());

    assert!(repo.delete_item(1).unwrap());
    assert!(!repo.delete_item(1).unwrap());
    assert!(repo.get_item(1).unwrap().is_none());
}

#[test]
fn reject_policy_leaves_existing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::with_policy(&conn, ConflictPolicy::Reject);
    repo.insert_item(&Item::new(1, "Apples", 10.0, 20)).unwrap();

    let err = repo
        .insert_item(&Item::new(1, "Pears", 1.0, 1))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(1)));
    assert_eq!(repo.get_item(1).unwrap().unwrap().name, "Apples");
}

#[test]
fn insert_generated_returns_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let first = repo.insert_generated("Apples", 1.0, 1).unwrap();
    let second = repo.insert_generated("", 2.0, 2).unwrap();
    assert!(second > first);
    assert_eq!(repo.get_item(second).unwrap().unwrap().name, "");
}

#[test]
fn writes_accept_unconventional_values_by_default() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn);

    let refund = Item::new(1, "Refund", -1.0, 0);
    repo.insert_item(&refund).unwrap();
    assert!(repo.update_item(&Item::new(1, "", -2.0, -4)).unwrap());

    assert_eq!(repo.get_item(1).unwrap().unwrap(), Item::new(1, "", -2.0, -4));
}

#[test]
fn validating_repository_rejects_writes_before_touching_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::new(&conn).validating(true);
    repo.insert_item(&Item::new(1, "Apples", 10.0, 20)).unwrap();

    let err = repo
        .update_item(&Item::new(1, "Apples", 10.0, -1))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ItemValidationError::NegativeQuantity(-1))
    ));
    assert!(matches!(
        repo.insert_item(&Item::new(2, "Refund", -1.0, 0)),
        Err(RepoError::Validation(ItemValidationError::InvalidPrice(_)))
    ));
    assert!(matches!(
        repo.insert_generated("  ", 1.0, 1),
        Err(RepoError::Validation(ItemValidationError::BlankName))
    ));

    assert_eq!(repo.list_items().unwrap(), vec![Item::new(1, "Apples", 10.0, 20)]);
}

#[test]
fn reads_return_stored_rows_without_validation() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO items (id, name, price, quantity) VALUES (1, 'Apples', 10.0, 20), (2, 'Legacy', -3.0, 1);",
        [],
    )
    .unwrap();
    let repo = SqliteItemRepository::new(&conn).validating(true);

    assert_eq!(
        repo.list_items().unwrap(),
        vec![
            Item::new(1, "Apples", 10.0, 20),
            Item::new(2, "Legacy", -3.0, 1),
        ]
    );
    assert_eq!(repo.get_item(2).unwrap().unwrap().price, -3.0);
}
