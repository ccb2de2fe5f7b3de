mod boundary;
mod tensor;
