use super::EntityMetadata;

/// Трейт для корня агрегата
///
/// Common accessors shared by Agent, PolicyHolder and Policy
pub trait AggregateRoot {
    /// Бизнес-код записи (например, "POL-2024-000001")
    fn code(&self) -> &str;

    fn description(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    /// Имя элемента для UI и сообщений об ошибках (единственное число)
    fn element_name() -> &'static str;
}
