//! Generates the types and conversions files of a small storage resource.
//!
//! Run with: `cargo run --example generate [output-dir]`
//!
//! Without an output directory the files are printed to stdout.

use typewright::prelude::*;

const PACKAGES: &str = r#"<packages>
<package path="example.com/sdk/storage" name="storage">
    <struct name="Bucket">
        <field name="Name" type="string" tag='json:"name"'/>
        <field name="Location" type="*string" tag='json:"location"'/>
        <field name="Versioned" type="*bool" tag='json:"versioned"'/>
        <field name="Labels" type="map[string]string" tag='json:"labels"'/>
        <field name="Lifecycle" type="*Lifecycle" tag='json:"lifecycle"'/>
        <field name="Created" type="*string" tag='json:"created"'/>
    </struct>
    <struct name="Lifecycle">
        <field name="Rules" type="[]Rule" tag='json:"rules"'/>
    </struct>
    <struct name="Rule">
        <field name="Action" type="string" tag='json:"action"'/>
        <field name="AgeDays" type="*int64" tag='json:"ageDays"'/>
    </struct>
</package>
</packages>"#;

const LOCAL_PACKAGE: &str = "example.com/apis/storage/v1alpha1";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = SchemaRegistry::from_documents([PACKAGES])?;
    typewright::schema::validate_registry(&registry)?;
    let cache = TypeCache::new(registry);

    let config = GeneratorConfig::builder()
        .local_package(LOCAL_PACKAGE)
        .build();
    let generator = Generator::new(&cache, config);
    let targets = [ResourceTarget::new("Bucket", "example.com/sdk/storage.Bucket")];

    let report = match std::env::args().nth(1) {
        Some(dir) => {
            let report = generator.run_batch(&targets, &mut DirectorySink::new(&dir));
            for file in &report.written {
                println!("Wrote {}/{}", dir, file.display());
            }
            report
        }
        None => {
            let mut sink = MemorySink::new();
            let report = generator.run_batch(&targets, &mut sink);
            for (path, contents) in sink.iter() {
                println!("// ---- {} ----", path.display());
                println!("{contents}");
            }
            report
        }
    };

    let stats = cache.stats();
    println!(
        "Generated {} files, {} failures (cache: {} hits, {} misses)",
        report.written.len(),
        report.failures.len(),
        stats.hits,
        stats.misses
    );

    match report.failures.into_iter().next() {
        Some((_, err)) => Err(err.into()),
        None => Ok(()),
    }
}
