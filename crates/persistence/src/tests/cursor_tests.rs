// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::*;
use crate::RegistrationQuery;

fn populate(db: &mut Persistence, count: i64) -> (ResourceRef, Vec<i64>) {
    let resource: ResourceRef = create_competition(db, None);
    let ids: Vec<i64> = (1..=count)
        .map(|registrant| id_of(&submit(db, resource, registrant)))
        .collect();
    (resource, ids)
}

#[test]
fn test_query_returns_submission_order_across_pages() {
    let mut db: Persistence = new_db();
    let (resource, ids) = populate(&mut db, 7);

    let mut query: RegistrationQuery<'_> =
        db.query_registrations(resource).unwrap().with_page_size(3);
    let seen: Vec<i64> = query.iter().map(|r| id_of(&r.unwrap())).collect();

    assert_eq!(seen, ids);
}

#[test]
fn test_query_is_restartable() {
    let mut db: Persistence = new_db();
    let (resource, ids) = populate(&mut db, 5);

    let mut query: RegistrationQuery<'_> =
        db.query_registrations(resource).unwrap().with_page_size(2);
    let partial: Vec<i64> = query.iter().take(3).map(|r| id_of(&r.unwrap())).collect();
    let full: Vec<i64> = query.iter().map(|r| id_of(&r.unwrap())).collect();

    assert_eq!(partial, ids[..3].to_vec());
    assert_eq!(full, ids);
}

#[test]
fn test_query_page_size_matching_row_count() {
    let mut db: Persistence = new_db();
    let (resource, ids) = populate(&mut db, 4);

    let all: Vec<Registration> = db
        .query_registrations(resource)
        .unwrap()
        .with_page_size(4)
        .fetch_all()
        .unwrap();
    assert_eq!(all.iter().map(id_of).collect::<Vec<i64>>(), ids);
}

#[test]
fn test_query_includes_every_status() {
    let mut db: Persistence = new_db();
    let (resource, ids) = populate(&mut db, 3);
    cancel(&mut db, ids[1]);

    let all: Vec<Registration> = db.query_registrations(resource).unwrap().fetch_all().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].status(), RegistrationStatus::Cancelled);
}

#[test]
fn test_query_is_scoped_to_resource() {
    let mut db: Persistence = new_db();
    let (first, _) = populate(&mut db, 2);
    let second: ResourceRef = create_competition(&mut db, None);
    submit(&mut db, second, 1);

    assert_eq!(db.query_registrations(first).unwrap().fetch_all().unwrap().len(), 2);
    assert_eq!(db.query_registrations(second).unwrap().fetch_all().unwrap().len(), 1);
}

#[test]
fn test_query_on_missing_resource() {
    let mut db: Persistence = new_db();
    let missing: ResourceRef = ResourceRef::new(ResourceKind::Event, 5);
    assert!(matches!(
        db.query_registrations(missing),
        Err(PersistenceError::ResourceNotFound(_))
    ));
}
