use pstree::{Error, OrphanPolicy, ProcessTree, ROOT_PID, TreeBuilder};
use std::fs;
use std::path::Path;

/// Lay out a fake procfs: one `<pid>/stat` per entry plus the usual non-pid noise
fn fake_proc(root: &Path, processes: &[(&str, &str, &str)]) {
    for (pid, name, ppid) in processes {
        let dir = root.join(pid);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("stat"),
            format!("{pid} ({name}) S {ppid} {pid} {pid} 0 -1 4194560 100 0 0 0\n"),
        )
        .unwrap();
    }
    fs::create_dir_all(root.join("self")).unwrap();
    fs::create_dir_all(root.join("sys")).unwrap();
    fs::write(root.join("uptime"), "350735.47 234388.90\n").unwrap();
}

fn build(root: &Path) -> pstree::Result<ProcessTree> {
    TreeBuilder::from_proc_root(root).build()
}

#[test_log::test]
fn test_scan_fake_proc() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    fake_proc(
        tmp_dir.path(),
        &[
            ("1", "systemd", "0"),
            ("2", "kthreadd", "0"),
            ("412", "systemd-journal", "1"),
            ("977", "Web Content", "1"),
            ("978", "(sd-pam)", "977"),
            ("31", "kworker/1:0H-events_highpri", "2"),
        ],
    );

    let tree = build(tmp_dir.path())?;
    assert_eq!(tree.process_count(), 7);
    assert_eq!(
        tree.to_string(),
        "sched (0)\n\
         \u{20}systemd (1)\n\
         \u{20} systemd-journal (412)\n\
         \u{20} Web Content (977)\n\
         \u{20}  (sd-pam) (978)\n\
         \u{20}kthreadd (2)\n\
         \u{20} kworker/1:0H-events_highpri (31)\n"
    );
    Ok(())
}

#[test_log::test]
fn test_scan_skips_vanished_process() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    fake_proc(tmp_dir.path(), &[("1", "init", "0"), ("2", "sh", "1")]);
    // Directory still listed, record already gone
    fs::create_dir_all(tmp_dir.path().join("3"))?;

    let tree = build(tmp_dir.path())?;
    assert!(!tree.contains("3"));
    assert_eq!(pstree::render_tree(&tree)?, "sched (0)\n init (1)\n  sh (2)\n");
    Ok(())
}

#[test_log::test]
fn test_scan_tolerates_non_utf8_name() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    fake_proc(tmp_dir.path(), &[("1", "init", "0")]);
    fs::create_dir_all(tmp_dir.path().join("2"))?;
    fs::write(tmp_dir.path().join("2").join("stat"), b"2 (bad\xffname) S 1 0 0\n")?;

    let tree = build(tmp_dir.path())?;
    assert_eq!(tree.get("2").unwrap().name, "bad\u{fffd}name");
    assert_eq!(
        tree.to_string(),
        "sched (0)\n init (1)\n  bad\u{fffd}name (2)\n"
    );
    Ok(())
}

#[test_log::test]
fn test_scan_rejects_corrupt_record() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    fake_proc(tmp_dir.path(), &[("1", "init", "0")]);
    fs::create_dir_all(tmp_dir.path().join("2"))?;
    fs::write(tmp_dir.path().join("2").join("stat"), "2 sh S 1\n")?;

    let err = build(tmp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "unexpected error: {err:?}");
    Ok(())
}

#[test_log::test]
fn test_scan_missing_proc_root() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let err = build(&tmp_dir.path().join("proc")).unwrap_err();
    assert!(matches!(err, Error::Enumeration { .. }), "unexpected error: {err:?}");
}

#[test_log::test]
fn test_scan_empty_proc() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;

    let tree = build(tmp_dir.path())?;
    assert_eq!(tree.process_count(), 1);
    assert!(tree.root().children.is_empty());
    assert_eq!(tree.to_string(), "sched (0)\n");
    Ok(())
}

#[cfg(target_os = "linux")]
mod live {
    use super::*;

    fn live_tree() -> ProcessTree {
        // Processes come and go while the test runs, adopting keeps the scan from failing on
        // a parent that exited in between
        TreeBuilder::from_proc_root("/proc")
            .with_orphan_policy(OrphanPolicy::Adopt)
            .build()
            .unwrap()
    }

    #[test_log::test]
    fn test_live_scan_contains_current_process() {
        let tree = live_tree();
        let me = std::process::id().to_string();

        let process = tree.get(&me).expect("current process should be part of the tree");
        let stat = procfs::process::Process::myself().unwrap().stat().unwrap();
        assert_eq!(process.name, stat.comm);

        let parent = process.parent.as_ref().unwrap();
        assert!(tree.contains(parent.as_str()));
        if tree.get(parent.as_str()).unwrap().id.as_str() != ROOT_PID {
            assert_eq!(parent.as_str(), stat.ppid.to_string());
        }
        assert!(tree.get(parent.as_str()).unwrap().children.contains(&process.id));
    }

    #[test_log::test]
    fn test_live_render_mentions_current_process() {
        let tree = live_tree();
        let me = std::process::id().to_string();

        let rendered = tree.to_string();
        assert!(rendered.starts_with("sched (0)\n"));
        assert!(rendered.contains(&format!(" ({me})\n")));
        assert_eq!(rendered.lines().count(), tree.process_count());
    }
}
