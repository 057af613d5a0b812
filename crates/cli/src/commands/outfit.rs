use std::path::PathBuf;

use wardrobe_core::{create_outfit, ApplicationError, ClothingItem};

use super::{load_catalog, CommandResult};

const COMMAND: &str = "outfit";

#[derive(Clone, Debug, Default)]
pub struct OutfitRequest {
    pub catalog: PathBuf,
    pub item_ids: Vec<String>,
    pub name: String,
}

pub fn run(request: &OutfitRequest) -> CommandResult {
    match execute(request) {
        Ok(result) => result,
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn execute(request: &OutfitRequest) -> Result<CommandResult, ApplicationError> {
    if request.item_ids.is_empty() {
        return Err(ApplicationError::Catalog("an outfit needs at least one item id".to_string()));
    }

    let catalog = load_catalog(&request.catalog)?;
    let mut selected: Vec<ClothingItem> = Vec::with_capacity(request.item_ids.len());
    for id in &request.item_ids {
        let item = catalog
            .iter()
            .find(|item| item.id.as_str() == id)
            .ok_or_else(|| ApplicationError::Catalog(format!("item `{id}` is not in the catalog")))?;
        selected.push(item.clone());
    }

    let outfit = create_outfit(&selected, &request.name);
    Ok(CommandResult::success_with_data(
        COMMAND,
        format!("created outfit `{}` with {} item(s)", outfit.name, outfit.item_ids.len()),
        &outfit,
    ))
}
