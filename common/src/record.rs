use serde::{Serialize, Serializer};
use serde_json::Value;
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// Tipo genérico de registro (un item de una colección REST).
pub type Record = Value;

/// Colección en memoria de registros.
pub type Records = Vec<Record>;

/// Valor de la clave de agrupación de un registro.
/// Sólo enteros y strings: tienen que poder usarse como clave de mapa.
///
/// La identidad es la del texto de la clave, que es como termina escrita en
/// el JSON de salida: `Int(1)` y `Str("1")` son la misma clave. `Str("01")`
/// no lo es.
#[derive(Debug, Clone)]
pub enum GroupKey {
    Int(i64),
    Str(String),
}

/// Forma canónica para comparar: número si el texto es un entero canónico.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
enum KeyView<'a> {
    Num(i128),
    Text(&'a str),
}

/// "12" o "-3" sí; "012", "+3", "-0" o "" no.
fn canonical_int(s: &str) -> Option<i128> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let canonical = match digits.as_bytes() {
        [] => false,
        [b'0'] => digits.len() == s.len(),
        [first, ..] => *first != b'0' && digits.bytes().all(|b| b.is_ascii_digit()),
    };
    if canonical {
        s.parse().ok()
    } else {
        None
    }
}

impl GroupKey {
    /// Convierte un valor JSON en clave. Devuelve None para floats, bools,
    /// null, arrays u objetos.
    /// Enteros mayores que i64::MAX se guardan por su texto.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(GroupKey::Int)
                .or_else(|| n.as_u64().map(|u| GroupKey::Str(u.to_string()))),
            Value::String(s) => Some(GroupKey::Str(s.clone())),
            _ => None,
        }
    }

    fn view(&self) -> KeyView<'_> {
        match self {
            GroupKey::Int(n) => KeyView::Num(i128::from(*n)),
            GroupKey::Str(s) => match canonical_int(s) {
                Some(n) => KeyView::Num(n),
                None => KeyView::Text(s),
            },
        }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.view().hash(state);
    }
}

// Enteros (numéricamente) antes que strings (lexicográfico).
impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.view().cmp(&other.view())
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(n) => write!(f, "{n}"),
            GroupKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for GroupKey {
    fn from(n: i64) -> Self {
        GroupKey::Int(n)
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Str(s.to_string())
    }
}

// Se serializa como entero o string para poder ir como clave de objeto JSON.
impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Int(n) => serializer.serialize_i64(*n),
            GroupKey::Str(s) => serializer.serialize_str(s),
        }
    }
}
