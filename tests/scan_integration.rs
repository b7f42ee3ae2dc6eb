use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "deprec_scan_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    use std::io::Write;
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

fn run_json(args: &[&str]) -> anyhow::Result<Value> {
    Ok(serde_json::from_slice(&run_raw(args)?)?)
}

fn run_raw(args: &[&str]) -> anyhow::Result<Vec<u8>> {
    let out = Command::new(env!("CARGO_BIN_EXE_deprec-scan"))
        .args(args)
        .output()?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(out.stdout)
}

/// Minimal class-file assembler for fixtures: enough of the format for a
/// class with a superclass, Deprecated attributes and one method body.
mod classgen {
    #[derive(Default)]
    pub struct Pool {
        entries: Vec<Vec<u8>>,
    }

    impl Pool {
        fn push(&mut self, entry: Vec<u8>) -> u16 {
            self.entries.push(entry);
            self.entries.len() as u16
        }

        pub fn utf8(&mut self, s: &str) -> u16 {
            let mut e = vec![1u8];
            e.extend((s.len() as u16).to_be_bytes());
            e.extend(s.as_bytes());
            self.push(e)
        }

        pub fn class(&mut self, name: &str) -> u16 {
            let name_index = self.utf8(name);
            let mut e = vec![7u8];
            e.extend(name_index.to_be_bytes());
            self.push(e)
        }

        pub fn method_ref(&mut self, owner: &str, name: &str, desc: &str) -> u16 {
            let class_index = self.class(owner);
            let name_index = self.utf8(name);
            let desc_index = self.utf8(desc);
            let mut nat = vec![12u8];
            nat.extend(name_index.to_be_bytes());
            nat.extend(desc_index.to_be_bytes());
            let nat_index = self.push(nat);
            let mut e = vec![10u8];
            e.extend(class_index.to_be_bytes());
            e.extend(nat_index.to_be_bytes());
            self.push(e)
        }
    }

    pub struct MethodSpec {
        pub name: &'static str,
        pub desc: &'static str,
        pub code: Vec<u8>,
        pub deprecated: bool,
    }

    pub fn build(
        mut pool: Pool,
        name: &str,
        super_name: &str,
        deprecated: bool,
        methods: &[MethodSpec],
    ) -> Vec<u8> {
        let this_index = pool.class(name);
        let super_index = pool.class(super_name);
        let code_attr = pool.utf8("Code");
        let deprecated_attr = pool.utf8("Deprecated");
        let method_indices: Vec<(u16, u16)> = methods
            .iter()
            .map(|m| (pool.utf8(m.name), pool.utf8(m.desc)))
            .collect();

        let mut out = Vec::new();
        out.extend(0xCAFE_BABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(52u16.to_be_bytes());
        out.extend((pool.entries.len() as u16 + 1).to_be_bytes());
        for entry in &pool.entries {
            out.extend(entry);
        }
        out.extend(0x0021u16.to_be_bytes());
        out.extend(this_index.to_be_bytes());
        out.extend(super_index.to_be_bytes());
        out.extend(0u16.to_be_bytes()); // interfaces
        out.extend(0u16.to_be_bytes()); // fields

        out.extend((methods.len() as u16).to_be_bytes());
        for (m, (name_index, desc_index)) in methods.iter().zip(&method_indices) {
            out.extend(0x0001u16.to_be_bytes());
            out.extend(name_index.to_be_bytes());
            out.extend(desc_index.to_be_bytes());
            out.extend((1 + m.deprecated as u16).to_be_bytes());
            out.extend(code_attr.to_be_bytes());
            out.extend((m.code.len() as u32 + 12).to_be_bytes());
            out.extend(8u16.to_be_bytes());
            out.extend(8u16.to_be_bytes());
            out.extend((m.code.len() as u32).to_be_bytes());
            out.extend(&m.code);
            out.extend(0u16.to_be_bytes());
            out.extend(0u16.to_be_bytes());
            if m.deprecated {
                out.extend(deprecated_attr.to_be_bytes());
                out.extend(0u32.to_be_bytes());
            }
        }

        out.extend((deprecated as u16).to_be_bytes());
        if deprecated {
            out.extend(deprecated_attr.to_be_bytes());
            out.extend(0u32.to_be_bytes());
        }
        out
    }

    pub fn returning(name: &'static str, desc: &'static str, deprecated: bool) -> MethodSpec {
        MethodSpec {
            name,
            desc,
            code: vec![0xb1],
            deprecated,
        }
    }

    pub fn calling(owner: &str, method: &str, desc: &str) -> (Pool, Vec<u8>) {
        let mut pool = Pool::default();
        let target = pool.method_ref(owner, method, desc);
        let mut code = vec![0xb6];
        code.extend(target.to_be_bytes());
        code.push(0xb1);
        (pool, code)
    }
}

/// Core archive: `com/x/Old` deprecated as a whole (declares `doWork()V`),
/// `com/x/Base` live but with deprecated `run()V` and a never-used
/// deprecated `legacy()V`.
fn write_core(path: &Path) -> anyhow::Result<()> {
    let old = classgen::build(
        classgen::Pool::default(),
        "com/x/Old",
        "java/lang/Object",
        true,
        &[classgen::returning("doWork", "()V", false)],
    );
    let base = classgen::build(
        classgen::Pool::default(),
        "com/x/Base",
        "java/lang/Object",
        false,
        &[
            classgen::returning("run", "()V", true),
            classgen::returning("legacy", "()V", true),
            classgen::returning("fresh", "()V", false),
        ],
    );
    write_jar(
        path,
        &[("com/x/Old.class", &old[..]), ("com/x/Base.class", &base[..])],
    )
}

/// Plugin calling `com/x/Old#doWork()V` directly: deprecated-class usage.
fn write_class_user(path: &Path) -> anyhow::Result<()> {
    let (pool, code) = classgen::calling("com/x/Old", "doWork", "()V");
    let caller = classgen::build(
        pool,
        "com/a/Caller",
        "java/lang/Object",
        false,
        &[classgen::MethodSpec {
            name: "go",
            desc: "()V",
            code,
            deprecated: false,
        }],
    );
    write_jar(path, &[("com/a/Caller.class", &caller[..])])
}

/// Plugin declaring `com/x/Child extends com/x/Base` and calling
/// `Child#run()V`: usage only detectable through the inheritance graph.
/// Classes live in a nested jar, the newer packaging layout.
fn write_inheritor(path: &Path) -> anyhow::Result<()> {
    let child = classgen::build(
        classgen::Pool::default(),
        "com/x/Child",
        "com/x/Base",
        false,
        &[],
    );
    let (pool, code) = classgen::calling("com/x/Child", "run", "()V");
    let caller = classgen::build(
        pool,
        "com/b/Caller",
        "java/lang/Object",
        false,
        &[classgen::MethodSpec {
            name: "go",
            desc: "()V",
            code,
            deprecated: false,
        }],
    );

    let nested = temp_dir("nested.jar");
    write_jar(
        &nested,
        &[
            ("com/x/Child.class", &child[..]),
            ("com/b/Caller.class", &caller[..]),
        ],
    )?;
    let nested_bytes = std::fs::read(&nested)?;
    let _ = std::fs::remove_file(nested);
    write_jar(path, &[("WEB-INF/lib/inheritor.jar", &nested_bytes[..])])
}

#[test]
fn scan_reports_direct_and_inherited_usage() -> anyhow::Result<()> {
    let base = temp_dir("scan_flow");
    let core = base.join("core.war");
    let plugins = base.join("plugins");
    std::fs::create_dir_all(&plugins)?;
    write_core(&core)?;
    write_class_user(&plugins.join("class-user-1.0.hpi"))?;
    write_inheritor(&plugins.join("inheritor-2.0.hpi"))?;

    let report = run_json(&[
        "--no-namespace-filter",
        "scan",
        "--core",
        core.to_string_lossy().as_ref(),
        "--plugins",
        plugins.to_string_lossy().as_ref(),
    ])?;

    let class_user = &report["plugins"]["class-user 1.0"];
    assert_eq!(class_user["version"], Value::String("1.0".into()));
    assert_eq!(class_user["classes"][0], Value::String("com/x/Old".into()));
    assert_eq!(class_user["methods"], Value::Array(vec![]));

    let inheritor = &report["plugins"]["inheritor 2.0"];
    assert_eq!(
        inheritor["methods"][0],
        Value::String("com/x/Base#run()V".into())
    );

    assert_eq!(
        report["by_api"]["com/x/Base#run()V"][0],
        Value::String("inheritor 2.0".into())
    );
    assert!(
        report["unused"]["methods"]
            .as_array()
            .unwrap()
            .contains(&Value::String("com/x/Base#legacy()V".into()))
    );
    assert!(
        !report["unused"]["methods"]
            .as_array()
            .unwrap()
            .contains(&Value::String("com/x/Base#run()V".into()))
    );
    assert_eq!(report["failures"], Value::Object(Default::default()));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn ignored_artifact_is_skipped_even_when_corrupt() -> anyhow::Result<()> {
    let base = temp_dir("ignored");
    let core = base.join("core.war");
    let plugins = base.join("plugins");
    std::fs::create_dir_all(&plugins)?;
    write_core(&core)?;
    std::fs::write(plugins.join("python-wrapper.hpi"), b"truncated garbage")?;

    let report = run_json(&[
        "--no-namespace-filter",
        "scan",
        "--core",
        core.to_string_lossy().as_ref(),
        "--plugins",
        plugins.to_string_lossy().as_ref(),
    ])?;

    assert_eq!(report["plugins"], Value::Object(Default::default()));
    assert_eq!(report["failures"], Value::Object(Default::default()));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn corrupt_artifact_fails_alone_without_aborting_the_scan() -> anyhow::Result<()> {
    let base = temp_dir("corrupt");
    let core = base.join("core.war");
    let plugins = base.join("plugins");
    std::fs::create_dir_all(&plugins)?;
    write_core(&core)?;
    write_class_user(&plugins.join("class-user-1.0.hpi"))?;
    std::fs::write(plugins.join("broken-0.1.hpi"), b"half a download")?;

    let report = run_json(&[
        "--no-namespace-filter",
        "scan",
        "--core",
        core.to_string_lossy().as_ref(),
        "--plugins",
        plugins.to_string_lossy().as_ref(),
    ])?;

    assert!(report["failures"]["broken 0.1"].as_str().is_some());
    assert_eq!(
        report["plugins"]["class-user 1.0"]["classes"][0],
        Value::String("com/x/Old".into())
    );

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn scan_output_is_deterministic_across_runs() -> anyhow::Result<()> {
    let base = temp_dir("determinism");
    let core = base.join("core.war");
    let plugins = base.join("plugins");
    std::fs::create_dir_all(&plugins)?;
    write_core(&core)?;
    write_class_user(&plugins.join("class-user-1.0.hpi"))?;
    write_inheritor(&plugins.join("inheritor-2.0.hpi"))?;

    let core_arg = core.to_string_lossy().into_owned();
    let plugins_arg = plugins.to_string_lossy().into_owned();
    let args = [
        "--no-namespace-filter",
        "scan",
        "--core",
        &core_arg,
        "--plugins",
        &plugins_arg,
    ];
    let first = run_raw(&args)?;
    let second = run_raw(&args)?;
    assert_eq!(first, second);

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn catalog_lists_deprecated_keys() -> anyhow::Result<()> {
    let base = temp_dir("catalog");
    let core = base.join("core.war");
    write_core(&core)?;

    let catalog = run_json(&["catalog", "--core", core.to_string_lossy().as_ref()])?;

    let classes = catalog["classes"].as_array().unwrap();
    assert_eq!(classes, &[Value::String("com/x/Old".into())]);
    let methods = catalog["methods"].as_array().unwrap();
    assert!(methods.contains(&Value::String("com/x/Base#run()V".into())));
    assert!(methods.contains(&Value::String("com/x/Old#doWork()V".into())));
    assert!(!methods.contains(&Value::String("com/x/Base#fresh()V".into())));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn check_prints_one_usage_record() -> anyhow::Result<()> {
    let base = temp_dir("check");
    let core = base.join("core.war");
    let plugin = base.join("class-user-1.0.hpi");
    write_core(&core)?;
    write_class_user(&plugin)?;

    let record = run_json(&[
        "--no-namespace-filter",
        "check",
        "--core",
        core.to_string_lossy().as_ref(),
        plugin.to_string_lossy().as_ref(),
    ])?;

    assert_eq!(record["artifact"]["name"], Value::String("class-user".into()));
    assert_eq!(record["artifact"]["version"], Value::String("1.0".into()));
    assert_eq!(record["classes"][0], Value::String("com/x/Old".into()));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}
