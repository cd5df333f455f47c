use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueHint};
use oxdecl::{BuiltIns, DeclarationEngine, DeclarationReport, EngineConfig};
use oxiri::Iri;
use oxrdf::Graph;
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write, stdin, stdout};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about, version, name = "oxdecl")]
/// OxDecl command line tool adding the missing OWL 2 declarations to RDF files
struct Args {
    #[command(subcommand)]
    command: Command,
    /// Log what the engine does at the debug level
    ///
    /// The RUST_LOG environment variable takes precedence if set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Add the missing declarations to a RDF file and write the completed graph
    Declare {
        #[command(flatten)]
        input: Input,
        /// File to write the completed graph to
        ///
        /// If no file is given, stdout is used.
        /// In this case, the output format must be specified using the --output-format option.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// The format of the output file
        ///
        /// It can be an extension like "ttl" or a MIME type like "text/turtle".
        ///
        /// By default, the format is guessed from the output file extension.
        #[arg(long, required_unless_present = "output")]
        output_format: Option<String>,
    },
    /// Print as N-Triples the statements the declarations of a RDF file could not be inferred from
    Unresolved {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(clap::Args)]
struct Input {
    /// File to read the graph from
    ///
    /// If no file is given, stdin is used.
    /// In this case, the content format must be specified using the --format option.
    ///
    /// Dataset formats like TriG or N-Quads are only accepted without named graphs.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,
    /// The format of the file to read
    ///
    /// It can be an extension like "ttl" or a MIME type like "text/turtle".
    ///
    /// By default, the format is guessed from the file extension.
    #[arg(long, required_unless_present = "file")]
    format: Option<String>,
    /// Base IRI of the file to read
    #[arg(long, value_hint = ValueHint::Url)]
    base: Option<String>,
    /// RDF file listing extra reserved vocabulary terms
    ///
    /// Each term is typed with its category, for example `ex:p a owl:AnnotationProperty`.
    /// Reserved terms are never declared.
    /// Its format is guessed from the file extension.
    #[arg(long, value_hint = ValueHint::FilePath)]
    vocabulary: Option<PathBuf>,
    /// Maximal number of reasoning rounds
    #[arg(long, default_value_t = EngineConfig::default().max_rounds)]
    max_rounds: usize,
    /// Do not default the properties of the statements left unclear to annotation properties
    #[arg(long)]
    no_annotation_default: bool,
}

impl Input {
    fn engine(&self) -> anyhow::Result<DeclarationEngine> {
        let mut builtins = BuiltIns::owl2();
        if let Some(vocabulary) = &self.vocabulary {
            let graph = read_graph(
                BufReader::new(File::open(vocabulary).with_context(|| {
                    format!("Not able to open the vocabulary file {}", vocabulary.display())
                })?),
                rdf_format_from_path(vocabulary)?,
                None,
            )?
            .0;
            let count = builtins.extend_from_graph(&graph).with_context(|| {
                format!("Invalid vocabulary file {}", vocabulary.display())
            })?;
            info!("{count} reserved terms read from {}", vocabulary.display());
        }
        Ok(DeclarationEngine::with_config(
            builtins,
            EngineConfig {
                max_rounds: self.max_rounds,
                prefer_annotations: !self.no_annotation_default,
            },
        ))
    }

    fn load(&self) -> anyhow::Result<(Graph, Vec<(String, String)>)> {
        let format = if let Some(format) = &self.format {
            rdf_format_from_name(format)?
        } else if let Some(file) = &self.file {
            rdf_format_from_path(file)?
        } else {
            bail!("The --format option must be set when reading from stdin")
        };
        let base = self.base.as_deref();
        if let Some(file) = &self.file {
            read_graph(
                BufReader::new(
                    File::open(file)
                        .with_context(|| format!("Not able to open the file {}", file.display()))?,
                ),
                format,
                base,
            )
        } else {
            read_graph(stdin().lock(), format, base)
        }
    }

    /// Reads the input and runs the engine on it.
    fn declare(&self) -> anyhow::Result<(Graph, Vec<(String, String)>, DeclarationReport)> {
        let engine = self.engine()?;
        let (mut graph, prefixes) = self.load()?;
        let triple_count = graph.len();
        let report = engine.run(&mut graph);
        info!(
            "{} declarations added and {} retracted on {triple_count} triples in {} rounds, {} statements unresolved",
            report.declared(),
            report.retracted(),
            report.rounds(),
            report.unresolved().len()
        );
        Ok((graph, prefixes, report))
    }
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    match args.command {
        Command::Declare {
            input,
            output,
            output_format,
        } => {
            let output_format = if let Some(format) = output_format {
                rdf_format_from_name(&format)?
            } else if let Some(output) = &output {
                rdf_format_from_path(output)?
            } else {
                bail!("The --output-format option must be set when writing to stdout")
            };
            let (graph, prefixes, _) = input.declare()?;
            let serializer = serializer_with_prefixes(output_format, &prefixes)?;
            if let Some(output) = output {
                close_file_writer(write_graph(
                    &graph,
                    serializer,
                    BufWriter::new(File::create(&output).with_context(|| {
                        format!("Not able to create the file {}", output.display())
                    })?),
                )?)?;
            } else {
                write_graph(&graph, serializer, stdout().lock())?.flush()?;
            }
            Ok(())
        }
        Command::Unresolved { input } => {
            let (_, _, report) = input.declare()?;
            let mut writer =
                RdfSerializer::from_format(RdfFormat::NTriples).for_writer(stdout().lock());
            for triple in report.unresolved() {
                writer.serialize_triple(triple)?;
            }
            writer.finish()?.flush()?;
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn read_graph(
    read: impl Read,
    format: RdfFormat,
    base_iri: Option<&str>,
) -> anyhow::Result<(Graph, Vec<(String, String)>)> {
    let mut parser = RdfParser::from_format(format).without_named_graphs();
    if let Some(base_iri) = base_iri {
        let base_iri = Iri::parse(base_iri.to_owned())
            .with_context(|| format!("Invalid base IRI {base_iri}"))?;
        parser = parser.with_base_iri(base_iri.into_inner())?;
    }
    let mut reader = parser.for_reader(read);
    let mut graph = Graph::new();
    for quad in &mut reader {
        graph.insert(quad?.as_ref());
    }
    let prefixes = reader
        .prefixes()
        .map(|(name, iri)| (name.to_owned(), iri.to_owned()))
        .collect();
    Ok((graph, prefixes))
}

fn serializer_with_prefixes(
    format: RdfFormat,
    prefixes: &[(String, String)],
) -> anyhow::Result<RdfSerializer> {
    let mut serializer = RdfSerializer::from_format(format);
    for (prefix_name, prefix_iri) in prefixes {
        serializer = serializer
            .with_prefix(prefix_name, prefix_iri)
            .with_context(|| format!("Invalid IRI for prefix {prefix_name}: {prefix_iri}"))?;
    }
    Ok(serializer)
}

fn write_graph<W: Write>(graph: &Graph, serializer: RdfSerializer, write: W) -> anyhow::Result<W> {
    let mut writer = serializer.for_writer(write);
    for triple in graph {
        writer.serialize_triple(triple)?;
    }
    Ok(writer.finish()?)
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    format_from_path(path, |ext| {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    })
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}
