mod common;

use common::{fresh_session, fresh_volume};
use monofs::storage::MemoryStorage;
use monofs::{FsError, InodeType};

#[test]
fn create_write_seek_read_stat() {
    let mut session = fresh_session(128);

    session.create_file("hello").unwrap();
    let fd = session.open("hello").unwrap();
    assert_eq!(session.write(&fd, b"abcdefg").unwrap(), 7);

    session.seek(&fd, 0).unwrap();
    assert_eq!(session.read(&fd, 7).unwrap(), b"abcdefg");

    let stat = session.stat("hello").unwrap();
    assert_eq!(stat.file_type, InodeType::Regular);
    assert_eq!(stat.size, 7);
    assert_eq!(stat.links, 1);

    session.close(&fd).unwrap();
}

#[test]
fn read_advances_and_stops_at_the_end() {
    let mut session = fresh_session(32);
    session.create_file("f").unwrap();

    let fd = session.open("f").unwrap();
    session.write(&fd, b"0123456789").unwrap();
    session.seek(&fd, 4).unwrap();

    assert_eq!(session.read(&fd, 3).unwrap(), b"456");
    assert_eq!(session.read(&fd, 100).unwrap(), b"789");
    assert_eq!(session.read(&fd, 100).unwrap(), b"");
}

#[test]
fn directories_nest_and_empty_out() {
    let mut session = fresh_session(32);

    session.mkdir("d").unwrap();
    assert_eq!(session.stat(".").unwrap().links, 3);

    session.cd("d").unwrap();
    session.create_file("f").unwrap();
    session.cd("..").unwrap();

    let names: Vec<String> = session
        .list("")
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert!(names.contains(&"d".to_owned()));

    assert!(matches!(
        session.rmdir("d"),
        Err(FsError::DirectoryNotEmpty)
    ));

    session.unlink("d/f").unwrap();
    session.rmdir("d").unwrap();
    assert_eq!(session.stat(".").unwrap().links, 2);
    assert!(matches!(session.stat("d"), Err(FsError::NotFound(_))));
}

#[test]
fn symlinks_stat_and_resolve() {
    let mut session = fresh_session(32);

    // dangling target is fine at creation time
    session.symlink("/a/b", "lnk").unwrap();
    let stat = session.stat("lnk").unwrap();
    assert_eq!(stat.file_type, InodeType::Symlink);
    assert_eq!(stat.symlink_target.as_deref(), Some("/a/b"));
    assert_eq!(stat.size, 4);

    session.create_file("target").unwrap();
    session.symlink("target", "t1").unwrap();
    assert_eq!(
        session.stat("t1").unwrap().symlink_target.as_deref(),
        Some("target")
    );

    // open resolves through the symlink to the target inode
    let fd = session.open("t1").unwrap();
    session.write(&fd, b"via the link").unwrap();
    assert_eq!(session.stat("target").unwrap().size, 12);
    assert_ne!(
        session.stat("t1").unwrap().inode,
        session.stat("target").unwrap().inode
    );

    // opening the dangling link fails where its target is missing
    assert!(matches!(session.open("lnk"), Err(FsError::NotFound(_))));
}

#[test]
fn symlink_loops_are_bounded() {
    let mut session = fresh_session(32);

    session.symlink("s", "s").unwrap();
    assert!(matches!(session.open("s"), Err(FsError::TooManySymlinks)));

    session.symlink("pong", "ping").unwrap();
    session.symlink("ping", "pong").unwrap();
    assert!(matches!(
        session.open("ping"),
        Err(FsError::TooManySymlinks)
    ));
}

#[test]
fn symlink_chains_within_the_bound_resolve() {
    let mut session = fresh_session(64);
    session.create_file("end").unwrap();

    session.symlink("end", "hop0").unwrap();
    for i in 1..10 {
        session.symlink(&format!("hop{}", i - 1), &format!("hop{i}")).unwrap();
    }

    assert!(session.open("hop9").is_ok());
}

#[test]
fn hard_links_share_the_inode() {
    let mut session = fresh_session(32);

    session.create_file("a").unwrap();
    let fd = session.open("a").unwrap();
    session.write(&fd, b"shared").unwrap();

    session.link("a", "b").unwrap();
    let a = session.stat("a").unwrap();
    let b = session.stat("b").unwrap();
    assert_eq!(a.inode, b.inode);
    assert_eq!(a.links, 2);
    assert_eq!(b.links, 2);

    session.unlink("a").unwrap();
    let b = session.stat("b").unwrap();
    assert_eq!(b.links, 1);

    let fd = session.open("b").unwrap();
    assert_eq!(session.read(&fd, 6).unwrap(), b"shared");

    session.unlink("b").unwrap();
    assert!(matches!(session.stat("b"), Err(FsError::NotFound(_))));
}

#[test]
fn linking_a_directory_is_rejected() {
    let mut session = fresh_session(32);
    session.mkdir("d").unwrap();
    assert!(matches!(
        session.link("d", "d2"),
        Err(FsError::NotRegular)
    ));
}

#[test]
fn absolute_and_relative_paths_agree() {
    let mut session = fresh_session(64);

    session.mkdir("/d").unwrap();
    session.mkdir("/d/e").unwrap();
    session.create_file("/d/e/f").unwrap();

    let by_absolute = session.stat("/d/e/f").unwrap().inode;

    session.cd("d").unwrap();
    assert_eq!(session.stat("e/f").unwrap().inode, by_absolute);

    session.cd("e").unwrap();
    assert_eq!(session.stat("f").unwrap().inode, by_absolute);
    assert_eq!(session.stat("./f").unwrap().inode, by_absolute);
    assert_eq!(session.stat("../e/f").unwrap().inode, by_absolute);

    // a trailing slash resolves to the directory itself
    session.cd("/").unwrap();
    assert_eq!(
        session.list("d/e/").unwrap().len(),
        session.list("/d/e").unwrap().len()
    );
}

#[test]
fn symlinked_directories_traverse_in_the_middle_of_a_path() {
    let mut session = fresh_session(64);

    session.mkdir("real").unwrap();
    session.create_file("real/f").unwrap();
    session.symlink("real", "alias").unwrap();

    assert_eq!(
        session.stat("alias/f").unwrap().inode,
        session.stat("real/f").unwrap().inode
    );

    session.cd("alias").unwrap();
    assert_eq!(session.pwd(), session.fs().resolve(0, "/real").unwrap());
}

#[test]
fn relative_symlink_targets_resolve_against_their_directory() {
    let mut session = fresh_session(64);

    session.mkdir("d").unwrap();
    session.create_file("d/f").unwrap();
    // the link lives inside d, so its relative target is d/f
    session.symlink("f", "d/lnk").unwrap();

    assert_eq!(
        session.stat("d/f").unwrap().inode,
        session.fs().resolve(session.pwd(), "d/lnk").unwrap()
    );
}

#[test]
fn dot_entries_cannot_be_unlinked() {
    let mut session = fresh_session(32);
    assert!(matches!(session.unlink("."), Err(FsError::DotDotDelete)));
    assert!(matches!(session.unlink(".."), Err(FsError::DotDotDelete)));
    assert!(matches!(session.rmdir("."), Err(FsError::DotDotDelete)));
}

#[test]
fn unlinking_a_directory_is_redirected_to_rmdir() {
    let mut session = fresh_session(32);
    session.mkdir("d").unwrap();
    assert!(matches!(session.unlink("d"), Err(FsError::IsDirectory)));
}

#[test]
fn rmdir_on_a_regular_file_is_rejected() {
    let mut session = fresh_session(32);
    session.create_file("f").unwrap();
    assert!(matches!(session.rmdir("f"), Err(FsError::NotDirectory)));
}

#[test]
fn cd_into_a_file_is_rejected() {
    let mut session = fresh_session(32);
    session.create_file("f").unwrap();
    assert!(matches!(session.cd("f"), Err(FsError::NotDirectory)));
}

#[test]
fn duplicate_names_are_rejected() {
    let mut session = fresh_session(32);
    session.create_file("x").unwrap();
    assert!(matches!(
        session.create_file("x"),
        Err(FsError::AlreadyExists(_))
    ));
    assert!(matches!(
        session.mkdir("x"),
        Err(FsError::AlreadyExists(_))
    ));
}

#[test]
fn descriptor_writes_stop_at_the_direct_block_maximum() {
    let mut session = fresh_session(32);
    session.create_file("big").unwrap();

    let fd = session.open("big").unwrap();
    let full = vec![b'x'; monofs::MAX_FILE_SIZE];
    assert_eq!(session.write(&fd, &full).unwrap(), full.len());
    assert!(matches!(
        session.write(&fd, b"y"),
        Err(FsError::FileTooLarge)
    ));
}

#[test]
fn unknown_descriptors_are_rejected() {
    let mut session = fresh_session(32);
    let bogus = monofs::Fkey::new("99");

    assert!(matches!(
        session.read(&bogus, 1),
        Err(FsError::UnknownFd(_))
    ));
    assert!(matches!(
        session.write(&bogus, b"x"),
        Err(FsError::UnknownFd(_))
    ));
    assert!(matches!(session.seek(&bogus, 0), Err(FsError::UnknownFd(_))));
    assert!(matches!(session.close(&bogus), Err(FsError::UnknownFd(_))));

    session.create_file("f").unwrap();
    let fd = session.open("f").unwrap();
    session.close(&fd).unwrap();
    assert!(matches!(session.close(&fd), Err(FsError::UnknownFd(_))));
}

#[test]
fn descriptor_io_requires_a_regular_file() {
    let mut session = fresh_session(32);
    session.mkdir("d").unwrap();

    let fd = session.open("d").unwrap();
    assert!(matches!(session.read(&fd, 4), Err(FsError::NotRegular)));
    assert!(matches!(
        session.write(&fd, b"x"),
        Err(FsError::NotRegular)
    ));
}

#[test]
fn truncate_by_path_shrinks_and_grows() {
    let mut session = fresh_session(32);
    session.create_file("f").unwrap();

    let fd = session.open("f").unwrap();
    session.write(&fd, &[7u8; 2000]).unwrap();

    session.truncate("f", 100).unwrap();
    assert_eq!(session.stat("f").unwrap().size, 100);

    session.truncate("f", 300).unwrap();
    assert_eq!(session.stat("f").unwrap().size, 300);

    session.mkdir("d").unwrap();
    assert!(matches!(session.truncate("d", 0), Err(FsError::NotRegular)));
}

#[test]
fn mkfs_resets_the_session() {
    let mut session = fresh_session(32);
    session.mkdir("d").unwrap();
    session.cd("d").unwrap();
    session.create_file("f").unwrap();
    let fd = session.open("f").unwrap();

    session.mkfs(MemoryStorage::new(), 16).unwrap();

    assert_eq!(session.pwd(), 0);
    assert!(matches!(session.read(&fd, 1), Err(FsError::UnknownFd(_))));
    assert_eq!(session.list("").unwrap().len(), 2);
}

#[test]
fn invalid_names_are_rejected_at_creation() {
    let mut session = fresh_session(32);
    session.mkdir("d").unwrap();
    assert!(matches!(
        session.create_file("d/"),
        Err(FsError::InvalidName(_))
    ));

    let mut fs = fresh_volume(16);
    assert!(matches!(
        fs.create(0, "a/b", InodeType::Regular),
        Err(FsError::InvalidName(_))
    ));
    assert!(matches!(
        fs.create(0, "", InodeType::Regular),
        Err(FsError::InvalidName(_))
    ));
}
