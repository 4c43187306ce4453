use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::correlate::CorrelatedResult;
use crate::error::{AggregateError, Result};
use crate::record::{GroupKey, Record, Records};

/// Valor del mapa agregado: un conjunto fijo de slots con nombre,
/// cada uno con la lista de registros que fueron llegando.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    slots: Vec<(String, Records)>,
}

/// Mapa central: clave de agrupación -> entrada con todos sus slots.
pub type AggregateMap = BTreeMap<GroupKey, AggregateEntry>;

impl AggregateEntry {
    /// Entrada nueva con todos los slots vacíos.
    /// Cada llamada crea sus propios vectores, no hay aliasing entre claves.
    pub fn new(layout: &[String]) -> Self {
        Self {
            slots: layout.iter().map(|name| (name.clone(), Vec::new())).collect(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<&[Record]> {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, items)| items.as_slice())
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Records> {
        self.slots
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, items)| items)
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.iter().any(|(n, _)| n == name)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }
}

// Se serializa como objeto JSON respetando el orden de los slots.
impl Serialize for AggregateEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (name, items) in &self.slots {
            map.serialize_entry(name, items)?;
        }
        map.end()
    }
}

/// Orden de slots de cada entrada: primero el slot inicial,
/// después los declarados (sin repetir).
pub fn slot_layout(initial_slot: &str, slot_names: &[String]) -> Vec<String> {
    let mut layout = vec![initial_slot.to_string()];
    for name in slot_names {
        if !layout.iter().any(|n| n == name) {
            layout.push(name.clone());
        }
    }
    layout
}

/* =========================
   Construcción del mapa inicial
   ========================= */

/// Agrupa la colección primaria por `key_field`.
/// - la primera vez que aparece una clave se crea la entrada con todos los slots vacíos
/// - cada registro se agrega a `initial_slot` respetando el orden de llegada
/// - si algún registro no trae la clave se aborta todo
pub fn build_keyed_map(
    records: Records,
    key_field: &str,
    slot_names: &[String],
    initial_slot: &str,
) -> Result<AggregateMap> {
    let layout = slot_layout(initial_slot, slot_names);
    let mut map = AggregateMap::new();

    for (index, rec) in records.into_iter().enumerate() {
        let raw = rec
            .get(key_field)
            .ok_or_else(|| AggregateError::MissingKeyField {
                field: key_field.to_string(),
                index,
            })?;

        let key = GroupKey::from_value(raw).ok_or_else(|| AggregateError::UnsupportedKey {
            field: key_field.to_string(),
            index,
            value: raw.to_string(),
        })?;

        let entry = map
            .entry(key)
            .or_insert_with(|| AggregateEntry::new(&layout));

        match entry.slot_mut(initial_slot) {
            Some(items) => items.push(rec),
            None => {
                return Err(AggregateError::UnknownSlot {
                    slot: initial_slot.to_string(),
                })
            }
        }
    }

    Ok(map)
}

/* =========================
   Merge de resultados dependientes
   ========================= */

fn append_payload(items: &mut Records, payload: Value) {
    match payload {
        Value::Array(values) => items.extend(values),
        single => items.push(single),
    }
}

/// Vuelca un lote de resultados correlacionados en `slot`.
/// Primero valida todo el lote (claves y slot) y recién después muta,
/// así un error deja el mapa como estaba.
pub fn merge_results(
    map: &mut AggregateMap,
    results: Vec<CorrelatedResult>,
    slot: &str,
) -> Result<()> {
    for result in &results {
        let entry = map
            .get(&result.key)
            .ok_or_else(|| AggregateError::UnknownKey {
                key: result.key.clone(),
                slot: slot.to_string(),
            })?;
        if !entry.has_slot(slot) {
            return Err(AggregateError::UnknownSlot {
                slot: slot.to_string(),
            });
        }
    }

    for CorrelatedResult { key, payload } in results {
        let items = map
            .get_mut(&key)
            .and_then(|entry| entry.slot_mut(slot))
            .ok_or_else(|| AggregateError::UnknownKey {
                key: key.clone(),
                slot: slot.to_string(),
            })?;
        append_payload(items, payload);
    }

    Ok(())
}
