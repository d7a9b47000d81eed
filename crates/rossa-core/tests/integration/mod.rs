mod campaign;
mod sequence;
