//! Toast messages shown to shoppers (pt-BR).

pub const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
pub const ADD_FAILED: &str = "Erro na adição do produto";
pub const REMOVE_FAILED: &str = "Erro na remoção do produto";
pub const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";
