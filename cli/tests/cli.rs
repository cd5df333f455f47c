#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::NamedTempFile;
use assert_fs::prelude::*;
use predicates::prelude::*;

const PREFIXES: &str = "@prefix ex: <http://example.com/> .\n@prefix owl: <http://www.w3.org/2002/07/owl#> .\n@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n";

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("oxdecl")?)
}

fn turtle(body: &str) -> String {
    format!("{PREFIXES}{body}")
}

fn typed(subject: &str, category: &str) -> String {
    format!(
        "<http://example.com/{subject}> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#{category}> .\n"
    )
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn cli_declare_from_stdin_to_stdout() -> Result<()> {
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("ttl")
        .arg("--output-format")
        .arg("nt")
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .success()
        .stdout(
            predicate::str::contains(typed("A", "Class"))
                .and(predicate::str::contains(typed("B", "Class"))),
        );
    Ok(())
}

#[test]
fn cli_declare_file() -> Result<()> {
    let input_file = NamedTempFile::new("input.ttl")?;
    input_file.write_str(&turtle(
        "ex:p a owl:FunctionalProperty . ex:q a owl:FunctionalProperty . ex:a ex:p \"v\" ; ex:q ex:b .",
    ))?;
    let output_file = NamedTempFile::new("output.nt")?;
    cli_command()?
        .arg("declare")
        .arg("--file")
        .arg(input_file.path())
        .arg("--output")
        .arg(output_file.path())
        .assert()
        .success()
        .stdout("");
    output_file.assert(
        predicate::str::contains(typed("p", "DatatypeProperty"))
            .and(predicate::str::contains(typed("q", "ObjectProperty")))
            .and(predicate::str::contains(typed("a", "NamedIndividual")))
            .and(predicate::str::contains(typed("b", "NamedIndividual"))),
    );
    Ok(())
}

#[test]
fn cli_declare_with_base() -> Result<()> {
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("ttl")
        .arg("--base")
        .arg("http://example.com/")
        .arg("--output-format")
        .arg("application/n-triples")
        .write_stdin("<A> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <B> .")
        .assert()
        .success()
        .stdout(predicate::str::contains(typed("A", "Class")));
    Ok(())
}

#[test]
fn cli_declare_without_output_format() -> Result<()> {
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("ttl")
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-format"));
    Ok(())
}

#[test]
fn cli_declare_with_invalid_base() -> Result<()> {
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("ttl")
        .arg("--base")
        .arg("not an iri")
        .arg("--output-format")
        .arg("nt")
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid base IRI"));
    Ok(())
}

#[test]
fn cli_declare_with_unknown_format() -> Result<()> {
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("foo")
        .arg("--output-format")
        .arg("nt")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("The file format 'foo' is unknown"));
    Ok(())
}

#[test]
fn cli_declare_with_vocabulary() -> Result<()> {
    let vocabulary_file = NamedTempFile::new("vocabulary.ttl")?;
    vocabulary_file.write_str(&turtle("ex:B a owl:Class ."))?;
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("ttl")
        .arg("--output-format")
        .arg("nt")
        .arg("--vocabulary")
        .arg(vocabulary_file.path())
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .success()
        .stdout(
            predicate::str::contains(typed("A", "Class"))
                .and(predicate::str::contains(typed("B", "Class")).not()),
        );
    Ok(())
}

#[test]
fn cli_declare_with_invalid_vocabulary() -> Result<()> {
    let vocabulary_file = NamedTempFile::new("vocabulary.ttl")?;
    vocabulary_file.write_str(&turtle("ex:B a ex:Thing ."))?;
    cli_command()?
        .arg("declare")
        .arg("--format")
        .arg("ttl")
        .arg("--output-format")
        .arg("nt")
        .arg("--vocabulary")
        .arg(vocabulary_file.path())
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid vocabulary file"));
    Ok(())
}

#[test]
fn cli_unresolved() -> Result<()> {
    cli_command()?
        .arg("unresolved")
        .arg("--format")
        .arg("ttl")
        .write_stdin(turtle("_:x owl:onProperty ex:P ; owl:someValuesFrom ex:D ."))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<http://www.w3.org/2002/07/owl#someValuesFrom> <http://example.com/D> .",
        ));
    Ok(())
}

#[test]
fn cli_unresolved_on_complete_graph() -> Result<()> {
    cli_command()?
        .arg("unresolved")
        .arg("--format")
        .arg("ttl")
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .success()
        .stdout("");
    Ok(())
}

#[test]
fn cli_unresolved_without_annotation_default() -> Result<()> {
    let input = turtle("ex:A rdfs:domain ex:B .");
    cli_command()?
        .arg("unresolved")
        .arg("--format")
        .arg("ttl")
        .write_stdin(input.as_str())
        .assert()
        .success()
        .stdout("");
    cli_command()?
        .arg("unresolved")
        .arg("--format")
        .arg("ttl")
        .arg("--no-annotation-default")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(
            "<http://example.com/A> <http://www.w3.org/2000/01/rdf-schema#domain> <http://example.com/B> .\n",
        );
    Ok(())
}

#[test]
fn cli_max_rounds() -> Result<()> {
    cli_command()?
        .arg("unresolved")
        .arg("--format")
        .arg("ttl")
        .arg("--max-rounds")
        .arg("1")
        .write_stdin(turtle("ex:A rdfs:domain ex:B ."))
        .assert()
        .success()
        .stdout(predicate::str::contains("rdf-schema#domain"));
    Ok(())
}

#[test]
fn cli_verbose_logs_to_stderr() -> Result<()> {
    cli_command()?
        .arg("unresolved")
        .arg("--format")
        .arg("ttl")
        .arg("--verbose")
        .env_remove("RUST_LOG")
        .write_stdin(turtle("ex:A rdfs:subClassOf ex:B ."))
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("manifest phase added"));
    Ok(())
}
