use std::sync::Arc;

use anyhow::Result;
use catalog::pager::PAGE_SIZES;
use catalog::{CatalogService, CrudCatalog};
use serde_json::Value;
use tracing::{debug, info};

use super::{parse_payload, Context};
use crate::api_client::{FilterInput, RestEntity, Resource};
use crate::render::{render_view, TableRow};
use crate::terminal::{Terminal, TerminalConfirm};

const HELP: &str = "\
Comandos:
  next | prev            página siguiente / anterior
  page N                 ir a la página N
  size N                 filas por página (5, 10, 15, 25)
  search TEXTO | clear   buscar / limpiar búsqueda
  new                    abrir formulario de alta
  edit ID                abrir formulario de edición
  save JSON              enviar el formulario abierto
  cancel                 cerrar el formulario
  delete ID              eliminar (pide confirmación)
  reload | dismiss       recargar / ocultar aviso
  help | quit";

/// One line typed in a browse session.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Next,
    Prev,
    Page(usize),
    Size(usize),
    Search(String),
    Clear,
    New,
    Edit(i64),
    Save(Value),
    Cancel,
    Delete(i64),
    Reload,
    Dismiss,
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(arg: &str, what: &str) -> std::result::Result<T, String> {
    arg.trim()
        .parse()
        .map_err(|_| format!("'{}' no es {} válido", arg.trim(), what))
}

impl BrowseCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        let command = match word.to_lowercase().as_str() {
            "next" | "n" => BrowseCommand::Next,
            "prev" | "p" => BrowseCommand::Prev,
            "page" => BrowseCommand::Page(number(arg, "un número de página")?),
            "size" => {
                let size = number(arg, "un tamaño de página")?;
                if !PAGE_SIZES.contains(&size) {
                    return Err(format!("Tamaños disponibles: {:?}", PAGE_SIZES));
                }
                BrowseCommand::Size(size)
            }
            "search" | "s" => BrowseCommand::Search(arg.to_string()),
            "clear" => BrowseCommand::Clear,
            "new" => BrowseCommand::New,
            "edit" => BrowseCommand::Edit(number(arg, "un ID")?),
            "save" => BrowseCommand::Save(parse_payload(arg).map_err(|e| e.to_string())?),
            "cancel" => BrowseCommand::Cancel,
            "delete" | "rm" => BrowseCommand::Delete(number(arg, "un ID")?),
            "reload" | "r" => BrowseCommand::Reload,
            "dismiss" => BrowseCommand::Dismiss,
            "help" | "?" | "" => BrowseCommand::Help,
            "quit" | "q" | "exit" => BrowseCommand::Quit,
            other => return Err(format!("Comando desconocido: '{}'. Escribe 'help'.", other)),
        };
        Ok(command)
    }
}

pub async fn browse(
    ctx: &Context,
    resource: Resource,
    page_size: Option<usize>,
    filters: FilterInput,
) -> Result<()> {
    info!("Browsing {}", resource.label());
    for_resource!(resource, browse_catalog, ctx, resource, page_size, &filters)
}

async fn browse_catalog<E: RestEntity + TableRow>(
    ctx: &Context,
    resource: Resource,
    page_size: Option<usize>,
    filters: &FilterInput,
) -> Result<()> {
    let terminal = Terminal::new();
    let catalog = ctx.open::<E>(
        resource,
        TerminalConfirm::ask(Arc::clone(&terminal)),
        page_size,
        filters.values_for(resource),
    );

    catalog.reload().await;
    println!("{}", render_view(resource.label(), &catalog.view()));
    println!("Escribe 'help' para ver los comandos.");

    while let Some(line) = terminal.read_line("> ").await {
        let command = match BrowseCommand::parse(&line) {
            Ok(BrowseCommand::Quit) => break,
            Ok(BrowseCommand::Help) => {
                println!("{}", HELP);
                continue;
            }
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        debug!(?command, "Applying browse command");
        apply(&catalog, command).await;
        println!("{}", render_view(resource.label(), &catalog.view()));
    }

    Ok(())
}

async fn apply<S>(catalog: &CrudCatalog<S>, command: BrowseCommand)
where
    S: CatalogService<Create = Value>,
    S::Update: From<Value>,
{
    match command {
        BrowseCommand::Next => catalog.set_page(catalog.page() + 1).await,
        BrowseCommand::Prev => catalog.set_page(catalog.page().saturating_sub(1)).await,
        BrowseCommand::Page(page) => catalog.set_page(page).await,
        BrowseCommand::Size(size) => catalog.set_page_size(size).await,
        BrowseCommand::Search(text) => catalog.set_search_text(text).await,
        BrowseCommand::Clear => catalog.set_search_text("").await,
        BrowseCommand::New => catalog.open_create_form(),
        BrowseCommand::Edit(id) => match catalog.find(id) {
            Some(entity) => catalog.open_edit_form(entity),
            None => println!("#{} no está en la lista cargada", id),
        },
        BrowseCommand::Save(payload) => {
            if catalog.view().is_modal_open() {
                catalog.submit_form(payload).await;
            } else {
                println!("No hay formulario abierto: usa 'new' o 'edit ID'");
            }
        }
        BrowseCommand::Cancel => catalog.close_form(),
        BrowseCommand::Delete(id) => {
            if catalog.find(id).is_none() {
                println!("#{} no está en la lista cargada", id);
            } else if !catalog.delete_entity(id).await && catalog.notification().is_none() {
                println!("Operación cancelada");
            }
        }
        BrowseCommand::Reload => catalog.reload().await,
        BrowseCommand::Dismiss => catalog.dismiss_notification(),
        BrowseCommand::Help | BrowseCommand::Quit => {}
    }
}
