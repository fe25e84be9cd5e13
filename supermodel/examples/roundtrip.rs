//! Loads a schema document from disk, inspects it and writes it back out.
//!
//! Run with: `RUST_LOG=debug cargo run --example roundtrip`

use supermodel::prelude::*;

const PAGE_SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model xmlns="http://namespaces.supermodel.dev/schema">
    <schema name="Base">
        <textline name="slug" required="true" max_length="64"/>
    </schema>
    <schema bases="Base">
        <textline name="title" title="Title" required="true"/>
        <richtext name="body" format="markdown"/>
        <choice name="status" default="draft">
            <value>draft</value>
            <value>published</value>
        </choice>
        <list name="tags" unique="true">
            <value_type><textline max_length="20"/></value_type>
        </list>
        <widgets>
            <widget field="body" type="editor" rows="12"/>
            <widget field="unknown" type="ignored"/>
        </widgets>
    </schema>
</model>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("page.xml"), PAGE_SCHEMA)?;

    // Unknown tags fail the parse unless a handler is registered for them
    let mut fields = FieldRegistry::with_builtins();
    fields.register("richtext", CustomHandler);

    let loader = Loader::new(dir.path()).with_fields(fields.clone());
    let model = loader.load_file("page.xml", false, "")?;

    for schema in model.schemata() {
        let label = if schema.name.is_empty() {
            "<default>"
        } else {
            schema.name.as_str()
        };
        println!(
            "Schema {} in {} (bases: {:?})",
            label,
            schema.module,
            schema.base_names()
        );
        for field in schema.fields() {
            println!(
                "  {:<8} {:<10} required={}",
                field.name,
                field.kind.kind_name(),
                field.required
            );
        }
    }

    if let Some(hint) = model.widget("", "body") {
        println!("Widget for body: {:?}", hint);
    }

    let text = Serializer::new(&fields).serialize(&model)?;
    println!("\n{}", text);

    let page = loader.xml_schema("page.xml", "", "")?;
    println!("Default schema alone:\n{}", serialize_schema(page, "Page")?);

    Ok(())
}
