use super::*;

fn medium_in(dir: &tempfile::TempDir) -> FileMedium {
    FileMedium::new(dir.path().join("nested").join(SESSION_FILE))
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let medium = medium_in(&dir);
    assert_eq!(medium.get("token").unwrap(), None);
}

#[test]
fn set_creates_parent_dirs_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let medium = medium_in(&dir);
    medium.set("token", r#"{"access_token":"abc","token_type":"bearer"}"#).unwrap();

    let reopened = medium_in(&dir);
    assert_eq!(
        reopened.get("token").unwrap().as_deref(),
        Some(r#"{"access_token":"abc","token_type":"bearer"}"#)
    );
}

#[test]
fn remove_deletes_only_that_key() {
    let dir = tempfile::tempdir().unwrap();
    let medium = medium_in(&dir);
    medium.set("a", "1").unwrap();
    medium.set("b", "2").unwrap();
    medium.remove("a").unwrap();
    assert_eq!(medium.get("a").unwrap(), None);
    assert_eq!(medium.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn no_temp_file_left_after_write() {
    let dir = tempfile::tempdir().unwrap();
    let medium = medium_in(&dir);
    medium.set("a", "1").unwrap();
    medium.set("b", "2").unwrap();
    medium.remove("a").unwrap();

    let names: Vec<_> = std::fs::read_dir(medium.path().parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from(SESSION_FILE)]);
}

#[cfg(unix)]
#[test]
fn session_file_is_private_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let medium = medium_in(&dir);
    medium.set("token", r#"{"access_token":"abc","token_type":"bearer"}"#).unwrap();

    let mode = std::fs::metadata(medium.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0, "mode {mode:o}");
}

#[test]
fn file_directly_in_existing_dir_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let medium = FileMedium::new(dir.path().join(SESSION_FILE));
    medium.set("a", "1").unwrap();
    assert_eq!(medium.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn malformed_file_fails_reads_but_heals_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let medium = medium_in(&dir);
    std::fs::create_dir_all(medium.path().parent().unwrap()).unwrap();
    std::fs::write(medium.path(), "[1, 2, 3]").unwrap();

    assert!(matches!(medium.get("a"), Err(StorageError::Malformed(_))));

    medium.set("a", "1").unwrap();
    assert_eq!(medium.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn unwritable_location_falls_back_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "a file, not a directory").unwrap();

    let store = crate::storage::PersistentStore::open(FileMedium::new(blocker.join(SESSION_FILE)));
    assert!(!store.is_durable());
    store.set("token", "abc");
    assert_eq!(store.get("token").as_deref(), Some("abc"));
}

#[test]
fn store_over_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SESSION_FILE);

    let store = crate::storage::PersistentStore::open(FileMedium::new(&path));
    assert!(store.is_durable());
    store.set("token", "abc");

    let reopened = crate::storage::PersistentStore::open(FileMedium::new(&path));
    assert_eq!(reopened.get("token").as_deref(), Some("abc"));
}
