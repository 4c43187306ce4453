use common::{LogLevel, Sink};
use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{error, info};

/// Progreso por tracing (stderr) y el mapa a stdout o a un archivo.
/// Si escribir el archivo falla, el error queda guardado para que el
/// comando termine con error.
pub struct ConsoleSink {
    output: Option<PathBuf>,
    write_error: Mutex<Option<io::Error>>,
}

impl ConsoleSink {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            write_error: Mutex::new(None),
        }
    }

    /// Error de la última escritura del resultado, si hubo.
    pub fn take_write_error(&self) -> Option<io::Error> {
        self.write_error.lock().ok().and_then(|mut e| e.take())
    }
}

fn write_output(path: &Path, text: &str) -> io::Result<()> {
    // Crear carpeta de salida si hace falta
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)
}

impl Sink for ConsoleSink {
    fn log(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Info => info!("{}", line),
            LogLevel::Error => error!("{}", line),
        }
    }

    fn publish(&self, text: &str) {
        match &self.output {
            Some(path) => match write_output(path, text) {
                Ok(()) => info!("resultado escrito en {}", path.display()),
                Err(e) => {
                    error!("no se pudo escribir {}: {}", path.display(), e);
                    if let Ok(mut slot) = self.write_error.lock() {
                        *slot = Some(e);
                    }
                }
            },
            None => println!("{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_dir(sub: &str) -> PathBuf {
        let base = env::temp_dir().join("client_sink_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    #[test]
    fn publish_escribe_el_archivo_creando_carpetas() {
        let path = temp_dir("nested").join("a").join("out.json");
        let sink = ConsoleSink::new(Some(path.clone()));

        sink.publish("{\n \"1\": {}\n}");

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n \"1\": {}\n}");
        assert!(sink.take_write_error().is_none());
    }

    #[test]
    fn publish_guarda_el_error_si_la_salida_es_una_carpeta() {
        // la ruta de salida ya existe y es un directorio
        let dir = temp_dir("is_dir");
        let sink = ConsoleSink::new(Some(dir.clone()));

        sink.publish("{}");

        assert!(sink.take_write_error().is_some());
        assert!(dir.is_dir());
        // se consume una sola vez
        assert!(sink.take_write_error().is_none());
    }
}
